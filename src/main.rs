use std::path::Path;

use anyhow::Result;
use answer_sheet_grader::utils::logging;
use answer_sheet_grader::{App, Config};

/// 指定 TOML 配置文件的环境变量，未设置时从环境变量逐项读取
const CONFIG_ENV: &str = "GRADER_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => Config::from_toml_file(Path::new(&path))?,
        Err(_) => Config::from_env(),
    };

    config.validate()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
