/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 评分服务 API 基地址
    pub grader_api_base_url: String,
    /// 远程调用超时（秒）
    pub request_timeout_secs: u64,
    /// 题目集合持久化文件
    pub storage_file: String,
    /// 本地产物（生成代码/测试）缓存目录
    pub artifacts_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grader_api_base_url: "http://localhost:8000/api/v1".to_string(),
            request_timeout_secs: 120,
            storage_file: "cs_grader_state.json".to_string(),
            artifacts_dir: "textfiles".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            grader_api_base_url: std::env::var("GRADER_API_BASE_URL")
                .unwrap_or(default.grader_api_base_url),
            request_timeout_secs: std::env::var("GRADER_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.request_timeout_secs),
            storage_file: std::env::var("GRADER_STORAGE_FILE").unwrap_or(default.storage_file),
            artifacts_dir: std::env::var("GRADER_ARTIFACTS_DIR").unwrap_or(default.artifacts_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.verbose_logging),
        }
    }
}
