use anyhow::Result;
use doc_answer_fill::orchestrator::App;
use doc_answer_fill::utils::logging;
use doc_answer_fill::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    let report = App::initialize(config).await?.run().await?;

    // 只有 error 记录驱动非零退出状态
    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}
