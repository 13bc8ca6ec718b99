//! 评分服务 API 客户端
//!
//! 封装与远程评分服务的两次调用：
//! 代码生成（multipart 文件组）与测试执行（JSON 请求体）。
//! 两次调用都是单次尝试，重试策略由调用方决定。

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::analysis::AnalysisResult;
use crate::models::attachment::FileItem;
use crate::models::report::{ExecuteResponse, RawReport};

/// 生成调用的接口路径
const GENERATE_ENDPOINT: &str = "process/process-files";

/// 执行调用的接口路径
const EXECUTE_ENDPOINT: &str = "pytest/run";

/// 评分服务能力接口
///
/// 流程层只依赖这个接口，测试可以用确定性桩实现替换真实客户端。
#[async_trait]
pub trait GradingApi: Send + Sync {
    /// 生成调用：从两组输入文件产出代码、测试与逻辑评估
    async fn generate(
        &self,
        question_files: &[FileItem],
        pseudocode_files: &[FileItem],
    ) -> AppResult<AnalysisResult>;

    /// 执行调用：用给定代码和测试源码跑一次测试，返回原始报告
    async fn execute_tests(&self, code: &str, test_code: &str) -> AppResult<RawReport>;
}

/// 评分服务客户端
pub struct GraderClient {
    http: reqwest::Client,
    base_url: String,
}

impl GraderClient {
    /// 创建新的评分服务客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.grader_api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// 把附件转换为 multipart part
    ///
    /// 二进制附件在内存中以 data URL 字符串保存，
    /// 上送时还原为原始字节。
    fn part_for(item: &FileItem) -> AppResult<Part> {
        let part = if item.is_binary() {
            let payload = item
                .content
                .split_once("base64,")
                .map(|(_, data)| data)
                .unwrap_or(&item.content);
            let bytes = BASE64
                .decode(payload)
                .map_err(|e| AppError::malformed_response(&item.name, e))?;
            Part::bytes(bytes)
        } else {
            Part::text(item.content.clone())
        };

        part.file_name(item.name.clone())
            .mime_str(&item.mime_type)
            .map_err(|e| AppError::api_request_failed(&item.name, e))
    }

    /// 解析非成功响应的错误消息
    ///
    /// 先尝试结构化的 `detail` 字段，解析失败时退回原始文本。
    async fn error_message(response: reqwest::Response) -> String {
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => value
                .get("detail")
                .and_then(|d| d.as_str())
                .map(|s| s.to_string())
                .unwrap_or(text),
            Err(_) => text,
        }
    }
}

#[async_trait]
impl GradingApi for GraderClient {
    async fn generate(
        &self,
        question_files: &[FileItem],
        pseudocode_files: &[FileItem],
    ) -> AppResult<AnalysisResult> {
        let endpoint = self.endpoint(GENERATE_ENDPOINT);
        debug!(
            "生成调用: {} 个题目文件, {} 个伪代码文件",
            question_files.len(),
            pseudocode_files.len()
        );

        let mut form = Form::new();
        for item in question_files {
            form = form.part("question_files", Self::part_for(item)?);
        }
        for item in pseudocode_files {
            form = form.part("pseudocode_files", Self::part_for(item)?);
        }

        let response = self
            .http
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            warn!("生成调用失败: status={}, message={}", status, message);
            return Err(AppError::bad_response(&endpoint, status.as_u16(), message));
        }

        response
            .json::<AnalysisResult>()
            .await
            .map_err(|e| AppError::malformed_response(&endpoint, e))
    }

    async fn execute_tests(&self, code: &str, test_code: &str) -> AppResult<RawReport> {
        let endpoint = self.endpoint(EXECUTE_ENDPOINT);
        debug!(
            "执行调用: 代码 {} 字符, 测试 {} 字符",
            code.len(),
            test_code.len()
        );

        let response = self
            .http
            .post(&endpoint)
            .json(&serde_json::json!({
                "code": code,
                "test_code": test_code,
            }))
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            warn!("执行调用失败: status={}, message={}", status, message);
            return Err(AppError::bad_response(&endpoint, status.as_u16(), message));
        }

        let body = response
            .json::<ExecuteResponse>()
            .await
            .map_err(|e| AppError::malformed_response(&endpoint, e))?;

        Ok(body.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GraderClient {
        GraderClient::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = test_client();
        assert_eq!(
            client.endpoint(EXECUTE_ENDPOINT),
            "http://localhost:8000/api/v1/pytest/run"
        );
    }

    #[test]
    fn test_part_for_decodes_data_url() {
        // "hello" 的 base64 编码
        let item = FileItem {
            name: "figure.png".to_string(),
            content: "data:image/png;base64,aGVsbG8=".to_string(),
            mime_type: "image/png".to_string(),
            preview: None,
        };
        assert!(GraderClient::part_for(&item).is_ok());
    }

    #[test]
    fn test_part_for_rejects_invalid_base64() {
        let item = FileItem {
            name: "broken.png".to_string(),
            content: "data:image/png;base64,不是base64".to_string(),
            mime_type: "image/png".to_string(),
            preview: None,
        };
        assert!(GraderClient::part_for(&item).is_err());
    }
}
