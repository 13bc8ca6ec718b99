//! 题目模型
//!
//! 一道可评分的题目：题目描述、伪代码、两侧附件、
//! 生命周期状态以及分析结果。

use serde::{Deserialize, Serialize};

use crate::models::analysis::AnalysisResult;
use crate::models::attachment::FileItem;

/// 题目生命周期状态
///
/// `pending → loading → completed | error`；
/// `completed` / `error` 之后可以再次提交重新进入 `loading`。
/// 状态只由流程层驱动，内容编辑不会改变状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Pending,
    Loading,
    Completed,
    Error,
}

/// 一道可评分的题目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// 创建时生成，生命周期内不变
    pub id: String,
    pub title: String,
    pub status: QuestionStatus,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub pseudocode: String,
    #[serde(default)]
    pub context_files: Vec<FileItem>,
    #[serde(default)]
    pub pseudocode_files: Vec<FileItem>,
    /// 生成调用成功后存在；`status == Completed` 时必然存在
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_result: Option<AnalysisResult>,
    /// 生成代码的用户可编辑副本，本地编辑不污染原始结果
    #[serde(default)]
    pub editable_code: String,
    #[serde(default)]
    pub editable_tests: String,
}

impl Question {
    /// 创建一道空题目（`pending` 状态）
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: QuestionStatus::Pending,
            context: String::new(),
            pseudocode: String::new(),
            context_files: Vec::new(),
            pseudocode_files: Vec::new(),
            analysis_result: None,
            editable_code: String::new(),
            editable_tests: String::new(),
        }
    }

    /// 合并一次部分更新，未提供的字段保持不变
    pub fn apply(&mut self, update: QuestionUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(context) = update.context {
            self.context = context;
        }
        if let Some(pseudocode) = update.pseudocode {
            self.pseudocode = pseudocode;
        }
        if let Some(files) = update.context_files {
            self.context_files = files;
        }
        if let Some(files) = update.pseudocode_files {
            self.pseudocode_files = files;
        }
        if let Some(result) = update.analysis_result {
            self.analysis_result = result;
        }
        if let Some(code) = update.editable_code {
            self.editable_code = code;
        }
        if let Some(tests) = update.editable_tests {
            self.editable_tests = tests;
        }
    }
}

/// 题目的部分更新
///
/// 所有字段可选；`analysis_result` 为双层 `Option`，
/// 外层表示"是否更新该字段"，内层表示更新后的值（可清空）。
#[derive(Debug, Clone, Default)]
pub struct QuestionUpdate {
    pub title: Option<String>,
    pub status: Option<QuestionStatus>,
    pub context: Option<String>,
    pub pseudocode: Option<String>,
    pub context_files: Option<Vec<FileItem>>,
    pub pseudocode_files: Option<Vec<FileItem>>,
    pub analysis_result: Option<Option<AnalysisResult>>,
    pub editable_code: Option<String>,
    pub editable_tests: Option<String>,
}

impl QuestionUpdate {
    /// 仅更新状态
    pub fn status(status: QuestionStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_question_is_pending_without_result() {
        let q = Question::new("q-1", "Question 1");
        assert_eq!(q.status, QuestionStatus::Pending);
        assert!(q.analysis_result.is_none());
        assert!(q.context.is_empty());
        assert!(q.editable_code.is_empty());
    }

    #[test]
    fn test_apply_merges_only_given_fields() {
        let mut q = Question::new("q-1", "Question 1");
        q.context = "原有描述".to_string();

        q.apply(QuestionUpdate {
            pseudocode: Some("x = 1".to_string()),
            status: Some(QuestionStatus::Loading),
            ..Default::default()
        });

        assert_eq!(q.pseudocode, "x = 1");
        assert_eq!(q.status, QuestionStatus::Loading);
        // 未给出的字段不受影响
        assert_eq!(q.context, "原有描述");
    }

    #[test]
    fn test_apply_can_clear_analysis_result() {
        let mut q = Question::new("q-1", "Question 1");
        q.analysis_result = Some(crate::models::analysis::AnalysisResult::from_editable(
            "x", "y",
        ));

        q.apply(QuestionUpdate {
            analysis_result: Some(None),
            ..Default::default()
        });

        assert!(q.analysis_result.is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&QuestionStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
