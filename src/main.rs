use anyhow::Result;
use batch_llm::utils::init_logging;
use batch_llm::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志，_logging 析构时刷新日志文件
    let _logging = init_logging(&config.log_dir)?;

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
