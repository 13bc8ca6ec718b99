use anyhow::Result;

use cs_grader::orchestrator::App;
use cs_grader::utils::logging;
use cs_grader::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(&config);

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
