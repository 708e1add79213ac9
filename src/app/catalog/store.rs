//! 房源目录存储
//!
//! 唯一拥有持久化数据写权限的组件。写入通过一把异步互斥锁串行化，
//! 锁覆盖整个 读取-修改-写回 过程。读取不加锁：写入是原子替换。

use std::{io, sync::Arc};
use tokio::sync::Mutex;
use tracing::info;

use super::model::{PropertyInput, PropertyRecord};
use crate::infrastructure::json_file::{JsonFile, StoreError};

#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<Inner>,
}

struct Inner {
    file: JsonFile,
    writer: Mutex<IdState>,
}

#[derive(Default)]
struct IdState {
    last_issued: u64,
}

impl CatalogStore {
    pub fn new(file: JsonFile) -> Self {
        Self {
            inner: Arc::new(Inner {
                file,
                writer: Mutex::new(IdState::default()),
            }),
        }
    }

    /// 读取全部房源，保持插入顺序
    pub async fn load(&self) -> Result<Vec<PropertyRecord>, StoreError> {
        Ok(self.inner.file.load::<PropertyRecord>().await?.items)
    }

    pub async fn get(&self, id: u64) -> Result<Option<PropertyRecord>, StoreError> {
        Ok(self.load().await?.into_iter().find(|record| record.id == id))
    }

    /// 分配新 id、追加并写回完整快照
    ///
    /// 读取-修改-写回在独立任务里执行：调用方的 future 被丢弃（例如请求超时）
    /// 时，已经开始的写入仍会完成或失败，不会留下半截的临时文件。
    pub async fn append(&self, input: PropertyInput) -> Result<PropertyRecord, StoreError> {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { inner.append(input).await });
        task.await.map_err(|err| StoreError::Io {
            action: "write",
            path: self.inner.file.path().to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, err),
        })?
    }
}

impl Inner {
    async fn append(&self, input: PropertyInput) -> Result<PropertyRecord, StoreError> {
        let mut ids = self.writer.lock().await;

        let mut snapshot = self.file.load::<PropertyRecord>().await?;
        let max_on_disk = snapshot.items.iter().map(|r| r.id).max().unwrap_or(0);
        let id = next_id(ids.last_issued, max_on_disk, now_millis());

        let record = PropertyRecord::from_input(id, input);
        snapshot.items.push(record.clone());
        self.file.store(&snapshot).await?;

        ids.last_issued = id;
        info!(
            id,
            total = snapshot.items.len(),
            "stored property {:?} in {}",
            record.name,
            self.file.path().display()
        );
        Ok(record)
    }
}

/// 下一个 id：不小于当前毫秒时间戳，且严格大于已发放和已落盘的最大 id
fn next_id(last_issued: u64, max_on_disk: u64, now_ms: u64) -> u64 {
    now_ms
        .max(last_issued.saturating_add(1))
        .max(max_on_disk.saturating_add(1))
}

fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::json_file::DocumentLayout;
    use std::time::Duration;
    use tempfile::tempdir;

    fn input(name: &str) -> PropertyInput {
        PropertyInput {
            name: name.to_string(),
            kind: "House".to_string(),
            price: Some(100_000.0),
            location: "Pune".to_string(),
            description: "test".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn next_id_tracks_clock_but_never_repeats() {
        assert_eq!(next_id(0, 0, 1_700_000_000_000), 1_700_000_000_000);
        // 同一毫秒内的第二次创建
        assert_eq!(next_id(1_700_000_000_000, 1_700_000_000_000, 1_700_000_000_000), 1_700_000_000_001);
        // 时钟回拨
        assert_eq!(next_id(50, 10, 3), 51);
        // 手工编辑过的文件里有更大的 id
        assert_eq!(next_id(5, 9_999_999_999_999, 1_700_000_000_000), 10_000_000_000_000);
    }

    #[test]
    fn next_id_saturates_at_u64_max() {
        assert_eq!(next_id(0, u64::MAX, 1_700_000_000_000), u64::MAX);
        assert_eq!(next_id(u64::MAX, 0, 1_700_000_000_000), u64::MAX);
    }

    #[tokio::test]
    async fn append_survives_a_dropped_caller() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("properties.json");
        let store = CatalogStore::new(JsonFile::new(&path, DocumentLayout::Array));

        // 占住写锁，让调用方必然超时，其 future 随即被丢弃
        let held = store.inner.writer.lock().await;
        let dropped =
            tokio::time::timeout(Duration::from_millis(50), store.append(input("Lake House"))).await;
        assert!(dropped.is_err());
        assert!(store.load().await.unwrap().is_empty());
        drop(held);

        let mut stored = Vec::new();
        for _ in 0..100 {
            stored = store.load().await.unwrap();
            if !stored.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Lake House");

        // 写锁释放后才能拿到，说明后台写入已经结束
        let next = store.append(input("City Flat")).await.unwrap();
        assert!(next.id > stored[0].id);
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["properties.json".to_string()]);
    }

    #[tokio::test]
    async fn failed_write_keeps_prior_records() {
        let dir = tempdir().unwrap();
        // 目标文件名合法，但加上临时文件前后缀后超过 NAME_MAX，写临时文件必然失败
        let path = dir.path().join(format!("{}.json", "p".repeat(230)));
        let prior = "[\n  {\n    \"id\": 1,\n    \"name\": \"Lake House\"\n  }\n]\n";
        std::fs::write(&path, prior).unwrap();
        let store = CatalogStore::new(JsonFile::new(&path, DocumentLayout::Array));

        let err = store.append(input("City Flat")).await.unwrap_err();
        assert!(err.is_write());

        assert_eq!(std::fs::read_to_string(&path).unwrap(), prior);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        let records = store.load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Lake House");
    }

    #[tokio::test]
    async fn append_assigns_unique_ids_in_order() {
        let dir = tempdir().unwrap();
        let store = CatalogStore::new(JsonFile::new(
            dir.path().join("properties.json"),
            DocumentLayout::Array,
        ));

        let mut ids = Vec::new();
        for n in 0..5 {
            ids.push(store.append(input(&format!("p{}", n))).await.unwrap().id);
        }
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted, ids);

        let names: Vec<String> = store.load().await.unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["p0", "p1", "p2", "p3", "p4"]);
    }

    #[tokio::test]
    async fn concurrent_appends_do_not_lose_updates() {
        let dir = tempdir().unwrap();
        let store = CatalogStore::new(JsonFile::new(
            dir.path().join("properties.json"),
            DocumentLayout::Array,
        ));

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move { store.append(input(&format!("p{}", n))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let records = store.load().await.unwrap();
        assert_eq!(records.len(), 16);
        let mut ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 16);
    }

    #[tokio::test]
    async fn get_finds_by_id() {
        let dir = tempdir().unwrap();
        let store = CatalogStore::new(JsonFile::new(
            dir.path().join("properties.json"),
            DocumentLayout::Array,
        ));
        let created = store.append(input("Lake House")).await.unwrap();

        assert_eq!(store.get(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(store.get(created.id + 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn failed_read_keeps_store_usable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("properties.json");
        std::fs::write(&path, "not json").unwrap();
        let store = CatalogStore::new(JsonFile::new(&path, DocumentLayout::Array));

        assert!(store.load().await.unwrap_err().is_corrupt());
        assert!(store.append(input("x")).await.unwrap_err().is_corrupt());
        // 损坏的文件不会被覆盖
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");

        std::fs::write(&path, "[]").unwrap();
        assert_eq!(store.append(input("x")).await.unwrap().name, "x");
    }
}
