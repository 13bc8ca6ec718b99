//! 附件摄入服务 - 业务能力层
//!
//! 只负责"把磁盘文件变成附件条目"的能力：
//! 推断类型、过滤白名单、编码二进制内容、生成图片预览。
//! 不支持的类型只跳过不中断，批次里其余文件照常摄入。

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::attachment::{self, FileItem};

/// 附件摄入服务
pub struct AttachmentIngestor;

impl AttachmentIngestor {
    /// 创建新的附件摄入服务
    pub fn new() -> Self {
        Self
    }

    /// 摄入单个文件
    ///
    /// # 参数
    /// - `path`: 文件路径，类型从扩展名推断
    ///
    /// # 返回
    /// 白名单之外的类型返回 `Ok(None)`（记录日志后跳过）；
    /// 读取失败才是真正的错误。
    pub async fn ingest_path(&self, path: &Path) -> AppResult<Option<FileItem>> {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => {
                warn!("⚠️ 跳过无法识别文件名的路径: {}", path.display());
                return Ok(None);
            }
        };

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        let mime_type = match attachment::mime_for_extension(extension) {
            Some(mime) => mime,
            None => {
                // 白名单之外：丢弃该文件，继续处理批次里的其他文件
                warn!("⚠️ 不支持的附件类型，已跳过: {}", name);
                return Ok(None);
            }
        };

        let item = if mime_type == "text/plain" {
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
            FileItem {
                name,
                content,
                mime_type: mime_type.to_string(),
                preview: None,
            }
        } else {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
            let content = format!("data:{};base64,{}", mime_type, BASE64.encode(&bytes));
            let mut item = FileItem {
                name,
                content,
                mime_type: mime_type.to_string(),
                preview: None,
            };
            item.rebuild_preview();
            item
        };

        debug!("✓ 摄入附件: {} ({})", item.name, item.mime_type);
        Ok(Some(item))
    }

    /// 批量摄入文件
    ///
    /// 并发读取，保持输入顺序，只保留被接受的文件。
    pub async fn ingest_all(&self, paths: &[PathBuf]) -> AppResult<Vec<FileItem>> {
        let results = join_all(paths.iter().map(|p| self.ingest_path(p))).await;

        let mut items = Vec::new();
        for result in results {
            if let Some(item) = result? {
                items.push(item);
            }
        }
        Ok(items)
    }
}

impl Default for AttachmentIngestor {
    fn default() -> Self {
        Self::new()
    }
}
