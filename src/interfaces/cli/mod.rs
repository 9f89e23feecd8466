//! CLI interface module

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};
use crate::config::StaticConfig;
use crate::errors::ShortenerError;
use crate::services::LinkShortener;
use crate::storage::StorageFactory;
use commands::{
    config_generate, delete_links, list_links, ping_storage, resolve_link, shorten_batch,
    shorten_link,
};

#[derive(Debug)]
pub enum CliError {
    Shortener(ShortenerError),
    CommandError(String),
}

impl CliError {
    pub fn format_simple(&self) -> String {
        match self {
            CliError::Shortener(err) => err.format_simple(),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::Shortener(err) => err.format_colored(),
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<ShortenerError> for CliError {
    fn from(err: ShortenerError) -> Self {
        CliError::Shortener(err)
    }
}

/// Run a CLI command against the configured storage backend
pub async fn run_cli_command(cmd: Commands, config: &StaticConfig) -> Result<(), CliError> {
    // 生成配置不需要存储
    if let Commands::Config { action } = cmd {
        return match action {
            ConfigCommands::Generate { output_path, force } => {
                config_generate(output_path, force).await
            }
        };
    }

    let store = StorageFactory::create(&config.storage).await?;
    let shortener = LinkShortener::from_config(store, &config.shortener);
    let base_url = config.shortener.base_url.as_str();

    match cmd {
        Commands::Shorten { url, owner } => shorten_link(&shortener, base_url, url, owner).await,
        Commands::Batch { urls, owner } => shorten_batch(&shortener, base_url, urls, owner).await,
        Commands::Resolve { short_id } => resolve_link(&shortener, short_id).await,
        Commands::List { owner } => list_links(&shortener, base_url, owner).await,
        Commands::Delete { owner, short_ids } => {
            delete_links(&shortener, config.deleter.to_settings(), owner, short_ids).await
        }
        Commands::Ping => ping_storage(&shortener).await,
        Commands::Config { .. } => unreachable!("handled above"),
    }
}
