use anyhow::Context;
use clap::Parser;
use tracing::debug;

use shortener::cli::Cli;
use shortener::config::{StaticConfig, get_config, init_config};
use shortener::interfaces::cli::run_cli_command;
use shortener::system::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = StaticConfig::load(&cli.config);
    // 命令行参数优先于配置文件和环境变量
    if let Some(path) = cli.file_storage_path {
        config.storage.file_storage_path = Some(path);
    }
    if let Some(dsn) = cli.database_dsn {
        config.storage.database_dsn = Some(dsn);
    }
    init_config(config);

    let config = get_config();
    let guard = init_logging(&config.logging).context("failed to initialize logging")?;
    debug!("Configuration: {:?}", config);

    let result = run_cli_command(cli.command, &config).await;
    // 退出前刷出缓冲的日志
    drop(guard);

    if let Err(e) = result {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
    Ok(())
}
