use anyhow::{Context, Result};
use robot_order::{logger, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load().context("加载配置失败")?;

    // 初始化日志
    logger::init(config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config).await.context("初始化浏览器失败")?;
    app.run().await.context("订单处理中止")?;

    Ok(())
}
