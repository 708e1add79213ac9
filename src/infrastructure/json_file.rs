//! JSON 文件存储基础设施
//!
//! 整个集合保存在一个 JSON 文档里，每次写入都是完整快照：
//! 先写同目录下的临时文件并 `sync_all`，再 `rename` 覆盖目标文件。
//! 读者因此只会看到旧快照或新快照。

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

/// 存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt catalog data in {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// 是否发生在写入阶段
    pub fn is_write(&self) -> bool {
        matches!(self, StoreError::Io { action, .. } if *action != "read")
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }
}

/// 文档布局
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentLayout {
    /// 顶层就是记录数组
    Array,
    /// 顶层是对象，`resource` 键下是记录数组，其余键原样保留
    Keyed { resource: String },
}

/// 一次完整读取的结果
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    rest: Map<String, Value>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            rest: Map::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
    layout: DocumentLayout,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>, layout: DocumentLayout) -> Self {
        Self {
            path: path.into(),
            layout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取整个集合。文件不存在或内容为空时返回空集合。
    pub async fn load<T: DeserializeOwned>(&self) -> Result<Snapshot<T>, StoreError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist yet, starting empty", self.path.display());
                return Ok(Snapshot::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    action: "read",
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(Snapshot::default());
        }

        let corrupt = |source: serde_json::Error| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        };

        match &self.layout {
            DocumentLayout::Array => {
                let items = serde_json::from_str(&raw).map_err(corrupt)?;
                Ok(Snapshot {
                    items,
                    rest: Map::new(),
                })
            }
            DocumentLayout::Keyed { resource } => {
                let mut rest: Map<String, Value> = serde_json::from_str(&raw).map_err(corrupt)?;
                let items = match rest.remove(resource) {
                    Some(value) => serde_json::from_value(value).map_err(corrupt)?,
                    None => Vec::new(),
                };
                Ok(Snapshot { items, rest })
            }
        }
    }

    /// 以原子替换的方式写入完整快照
    pub async fn store<T: Serialize>(&self, snapshot: &Snapshot<T>) -> Result<(), StoreError> {
        let bytes = self.render(snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error("create directory for", source))?;
        }

        let tmp = self.temp_path();
        if let Err(err) = write_synced(&tmp, &bytes).await {
            discard(&tmp).await;
            return Err(self.io_error("write", err));
        }

        if let Err(err) = fs::rename(&tmp, &self.path).await {
            discard(&tmp).await;
            return Err(self.io_error("replace", err));
        }

        debug!("wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }

    fn render<T: Serialize>(&self, snapshot: &Snapshot<T>) -> Result<Vec<u8>, StoreError> {
        let encoded = match &self.layout {
            DocumentLayout::Array => serde_json::to_vec_pretty(&snapshot.items),
            DocumentLayout::Keyed { resource } => serde_json::to_value(&snapshot.items)
                .and_then(|items| {
                    let mut document = snapshot.rest.clone();
                    document.insert(resource.clone(), items);
                    serde_json::to_vec_pretty(&document)
                }),
        };
        encoded.map_err(|err| self.io_error("encode", io::Error::new(io::ErrorKind::InvalidData, err)))
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "catalog.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
    }

    fn io_error(&self, action: &'static str, source: io::Error) -> StoreError {
        StoreError::Io {
            action,
            path: self.path.clone(),
            source,
        }
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.write_all(b"\n").await?;
    file.sync_all().await
}

async fn discard(tmp: &Path) {
    if let Err(err) = fs::remove_file(tmp).await {
        if err.kind() != io::ErrorKind::NotFound {
            warn!("could not remove temp file {}: {}", tmp.display(), err);
        }
    }
}
