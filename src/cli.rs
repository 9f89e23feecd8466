//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// shortener - short-link resolution engine
#[derive(Parser, Debug)]
#[command(name = "shortener")]
#[command(version)]
#[command(about = "Shorten URLs, resolve short ids and manage owned links", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, short = 'c', global = true, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Use the file-backed store at this path
    #[arg(long, short = 'f', global = true)]
    pub file_storage_path: Option<String>,

    /// Use a relational store (sqlite://..., postgres://...)
    #[arg(long, short = 'd', global = true)]
    pub database_dsn: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Shorten a URL
    Shorten {
        url: String,

        /// Owner of the new link (anonymous when omitted)
        #[arg(long, short = 'o', default_value = "")]
        owner: String,
    },

    /// Shorten several URLs in one write
    Batch {
        #[arg(required = true)]
        urls: Vec<String>,

        #[arg(long, short = 'o', default_value = "")]
        owner: String,
    },

    /// Resolve a short id to its URL
    Resolve { short_id: String },

    /// List an owner's active links
    List {
        #[arg(long, short = 'o')]
        owner: String,
    },

    /// Soft-delete links owned by an owner
    Delete {
        #[arg(long, short = 'o')]
        owner: String,

        #[arg(required = true)]
        short_ids: Vec<String>,
    },

    /// Check the storage connection
    Ping,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a configuration file with default values
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "shortener",
            "shorten",
            "https://example.com/a",
            "-o",
            "u1",
            "-f",
            "links.json",
        ]);
        assert_eq!(cli.file_storage_path.as_deref(), Some("links.json"));
        assert_eq!(cli.config, "config.toml");
        match cli.command {
            Commands::Shorten { url, owner } => {
                assert_eq!(url, "https://example.com/a");
                assert_eq!(owner, "u1");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_delete_requires_owner() {
        assert!(Cli::try_parse_from(["shortener", "delete", "abc"]).is_err());
        let cli = Cli::try_parse_from(["shortener", "delete", "-o", "u1", "a", "b"]).unwrap();
        assert!(matches!(cli.command, Commands::Delete { ref short_ids, .. } if short_ids.len() == 2));
    }
}
