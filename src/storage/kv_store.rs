//! 键值存储
//!
//! 持久化适配器之下的最底层存储抽象：按字符串键读写字符串值。
//! 文件实现把所有键放在同一个 JSON 对象文件里，整体读整体写。

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 键值存储能力接口
#[async_trait]
pub trait KvStore: Send + Sync {
    /// 读取键对应的值，键不存在时返回 `None`
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// 写入键值对
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// 删除键（键不存在时静默成功）
    async fn remove(&self, key: &str) -> AppResult<()>;
}

/// 文件键值存储
///
/// 单个 JSON 对象文件承载全部键值；每次写入都覆盖整个文件。
pub struct FileKvStore {
    path: PathBuf,
}

impl FileKvStore {
    /// 创建新的文件键值存储
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 读取整个键值映射
    ///
    /// 文件不存在视为空映射；文件内容损坏返回错误，
    /// 由上层决定如何恢复。
    async fn read_map(&self) -> AppResult<HashMap<String, String>> {
        let path_display = self.path.display().to_string();
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| AppError::persistence_corrupt(&path_display, e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(AppError::file_read_failed(&path_display, e)),
        }
    }

    /// 写回整个键值映射
    async fn write_map(&self, map: &HashMap<String, String>) -> AppResult<()> {
        let path_display = self.path.display().to_string();
        let text = serde_json::to_string(map)?;
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|e| AppError::file_write_failed(&path_display, e))
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let map = self.read_map().await?;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        // 读出失败（文件损坏）时从空映射重新开始，保证写入总能成功
        let mut map = match self.read_map().await {
            Ok(map) => map,
            Err(e) => {
                debug!("存储文件不可读，重建: {}", e);
                HashMap::new()
            }
        };
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let mut map = match self.read_map().await {
            Ok(map) => map,
            Err(_) => return Ok(()),
        };
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}

/// 内存键值存储
///
/// 用于测试和不需要落盘的临时运行。
/// 克隆共享同一份底层映射，方便在测试里模拟"同一份存储重新打开"。
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let map = self
            .map
            .lock()
            .map_err(|e| AppError::Other(format!("存储锁中毒: {}", e)))?;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut map = self
            .map
            .lock()
            .map_err(|e| AppError::Other(format!("存储锁中毒: {}", e)))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let mut map = self
            .map
            .lock()
            .map_err(|e| AppError::Other(format!("存储锁中毒: {}", e)))?;
        map.remove(key);
        Ok(())
    }
}
