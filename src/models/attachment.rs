//! 附件模型
//!
//! 定义题目两侧（题目描述 / 伪代码）所携带的附件条目，
//! 以及主文件（reserved name）的替换规则和 MIME 白名单。

use phf::{phf_map, phf_set};
use serde::{Deserialize, Serialize};

/// 题目描述侧的主文件名
pub const CONTEXT_PRIMARY_NAME: &str = "context.txt";

/// 伪代码侧的主文件名
pub const PSEUDOCODE_PRIMARY_NAME: &str = "pseudocode.txt";

/// 支持的附件 MIME 类型白名单，白名单之外的文件在摄入时直接拒绝
static SUPPORTED_MIME_TYPES: phf::Set<&'static str> = phf_set! {
    "text/plain",
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/gif",
};

/// 扩展名到 MIME 类型的映射（仅覆盖白名单内的类型）
static EXTENSION_MIME_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "txt" => "text/plain",
    "pdf" => "application/pdf",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "png" => "image/png",
    "gif" => "image/gif",
};

/// 题目的一侧：题目描述或伪代码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// 题目描述侧
    Context,
    /// 伪代码侧
    Pseudocode,
}

impl Side {
    /// 该侧主文件的保留文件名
    pub fn primary_name(&self) -> &'static str {
        match self {
            Side::Context => CONTEXT_PRIMARY_NAME,
            Side::Pseudocode => PSEUDOCODE_PRIMARY_NAME,
        }
    }
}

/// 单个附件条目
///
/// - 文本类型的 `content` 为原始文本
/// - 二进制类型（PDF / 图片）的 `content` 为 `data:{mime};base64,...` 形式的字符串
/// - `preview` 仅图片类型存在，是 `content` 的纯投影，不参与序列化，
///   加载后通过 [`FileItem::rebuild_preview`] 重建
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileItem {
    pub name: String,
    pub content: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(skip)]
    pub preview: Option<String>,
}

impl FileItem {
    /// 创建一个纯文本附件
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            mime_type: "text/plain".to_string(),
            preview: None,
        }
    }

    /// 是否为图片类型
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// 是否为二进制内容（data URL 编码存储）
    pub fn is_binary(&self) -> bool {
        self.is_image() || self.mime_type == "application/pdf"
    }

    /// 从持久化的 `content` 重建 `preview`
    ///
    /// 图片类型的持久化内容本身就是可展示的 data URL，
    /// 直接复制即可；非图片类型没有预览。
    pub fn rebuild_preview(&mut self) {
        if self.is_image() {
            self.preview = Some(self.content.clone());
        } else {
            self.preview = None;
        }
    }
}

/// 检查 MIME 类型是否在白名单内
pub fn is_supported_type(mime_type: &str) -> bool {
    SUPPORTED_MIME_TYPES.contains(mime_type)
}

/// 根据文件扩展名推断 MIME 类型（大小写不敏感）
///
/// 白名单之外的扩展名返回 `None`
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    EXTENSION_MIME_TYPES
        .get(extension.to_ascii_lowercase().as_str())
        .copied()
}

/// 以文件名为键替换或插入主文件
///
/// 先移除所有同名条目再追加新条目，保证同一保留名在列表中
/// 最多出现一次（幂等替换）。
pub fn upsert_primary(files: &mut Vec<FileItem>, primary_name: &str, text: &str) {
    files.retain(|f| f.name != primary_name);
    files.push(FileItem::text(primary_name, text));
}

/// 按文件名删除附件
pub fn remove_by_name(files: &mut Vec<FileItem>, name: &str) {
    files.retain(|f| f.name != name);
}
