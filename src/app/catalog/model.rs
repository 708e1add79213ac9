//! 房源数据模型

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// 未提供图片时使用的占位图地址前缀
pub const PLACEHOLDER_IMAGE_BASE: &str = "https://source.unsplash.com/400x300/?";

/// 已持久化的房源记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub longitude: Option<f64>,
    /// 手工编辑文件时加入的其他字段，重写时原样保留
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 创建房源的请求体：除 `id` 以外的全部字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PropertyInput {
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank"))]
    pub kind: String,

    #[serde(default, deserialize_with = "lenient_number")]
    #[validate(required, range(min = 0.0))]
    pub price: Option<f64>,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank"))]
    pub location: String,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank"))]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

impl PropertyInput {
    /// 把结构体字段名换成请求体里的键名
    pub fn wire_field_name(field: &str) -> &str {
        match field {
            "kind" => "type",
            other => other,
        }
    }
}

impl PropertyRecord {
    pub fn from_input(id: u64, input: PropertyInput) -> Self {
        Self {
            id,
            name: input.name,
            kind: input.kind,
            price: input.price.unwrap_or_default(),
            location: input.location,
            description: input.description,
            image: input.image.filter(|url| !url.trim().is_empty()),
            latitude: input.latitude,
            longitude: input.longitude,
            extra: Map::new(),
        }
    }

    /// 展示用图片地址，没有图片时按类型拼出占位图
    pub fn image_url(&self) -> Cow<'_, str> {
        match self.image.as_deref() {
            Some(url) if !url.trim().is_empty() => Cow::Borrowed(url),
            _ => {
                let topic = if self.kind.trim().is_empty() {
                    "house"
                } else {
                    self.kind.as_str()
                };
                Cow::Owned(format!("{}{}", PLACEHOLDER_IMAGE_BASE, topic))
            }
        }
    }

    /// 经纬度必须成对出现才算有坐标
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// `null` 按空字符串读取，手工编辑过的文件里常见
fn null_as_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

/// 数字或数字字符串都接受；无法解析的值视为缺失
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Option::<RawNumber>::deserialize(deserializer)? {
        Some(RawNumber::Number(n)) => Some(n),
        Some(RawNumber::Text(text)) => text.trim().parse::<f64>().ok(),
        None => None,
    };
    Ok(parsed.filter(|n| n.is_finite()))
}

fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.unwrap_or_default())
}
