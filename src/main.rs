use anyhow::Result;
use lesson_content_gen::utils::logging;
use lesson_content_gen::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置：优先使用 CONFIG_FILE 指定的 TOML 文件
    let config = match std::env::var("CONFIG_FILE") {
        Ok(path) => Config::from_toml_file(&path)?,
        Err(_) => Config::from_env(),
    };

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let _stats = App::initialize(config)?.run().await?;

    Ok(())
}
