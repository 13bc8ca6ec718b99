//! 本地产物缓存服务 - 业务能力层
//!
//! 只负责按文件名保存 / 读取 / 删除本地产物
//! （生成的代码、测试代码等），不关心流程顺序。

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, FileError};

/// 本地产物缓存服务
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// 创建新的产物缓存服务
    pub fn new(config: &Config) -> Self {
        Self {
            dir: PathBuf::from(&config.artifacts_dir),
        }
    }

    /// 使用自定义目录创建
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 保存产物
    ///
    /// # 参数
    /// - `filename`: 目标文件名（不允许包含路径分隔符）
    /// - `content`: 文件内容
    pub async fn save(&self, filename: &str, content: &str) -> AppResult<()> {
        let path = self.resolve(filename)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::file_write_failed(self.dir.display().to_string(), e))?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        debug!("✓ 产物已保存: {}", path.display());
        Ok(())
    }

    /// 读取产物内容
    pub async fn load(&self, filename: &str) -> AppResult<String> {
        let path = self.resolve(filename)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::File(FileError::NotFound {
                    path: path.display().to_string(),
                }))
            }
            Err(e) => Err(AppError::file_read_failed(path.display().to_string(), e)),
        }
    }

    /// 删除产物
    pub async fn delete(&self, filename: &str) -> AppResult<()> {
        let path = self.resolve(filename)?;
        tokio::fs::remove_file(&path).await.map_err(|e| {
            AppError::File(FileError::DeleteFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })?;
        debug!("✓ 产物已删除: {}", path.display());
        Ok(())
    }

    /// 把文件名解析为目录内路径
    ///
    /// 拒绝包含路径分隔符的文件名，产物只能落在缓存目录内。
    fn resolve(&self, filename: &str) -> AppResult<PathBuf> {
        if filename.is_empty() || filename.contains('/') || filename.contains('\\') {
            return Err(AppError::File(FileError::InvalidFilename {
                name: filename.to_string(),
            }));
        }
        Ok(self.dir.join(Path::new(filename)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_load_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::with_dir(dir.path());

        store.save("code.py", "x = 1").await.unwrap();
        assert_eq!(store.load("code.py").await.unwrap(), "x = 1");

        store.delete("code.py").await.unwrap();
        assert!(store.load("code.py").await.is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::with_dir(dir.path());

        match store.load("ghost.py").await {
            Err(AppError::File(FileError::NotFound { .. })) => {}
            other => panic!("期望 NotFound，实际: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_rejects_path_separators() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::with_dir(dir.path());

        assert!(store.save("../escape.py", "x").await.is_err());
        assert!(store.load("a/b.py").await.is_err());
        assert!(store.delete("").await.is_err());
    }
}
