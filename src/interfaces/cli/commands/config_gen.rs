//! Generate config command

use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

use crate::config::StaticConfig;
use crate::interfaces::cli::CliError;

pub async fn config_generate(output_path: Option<String>, force: bool) -> Result<(), CliError> {
    let path = output_path.unwrap_or_else(|| "config.example.toml".to_string());

    if !force && Path::new(&path).exists() && !confirm_overwrite(&path)? {
        println!("{}", "Aborted.".red());
        return Ok(());
    }

    std::fs::write(&path, StaticConfig::generate_sample_config()).map_err(|e| {
        CliError::CommandError(format!("Unable to write configuration file {}: {}", path, e))
    })?;

    println!(
        "{} {}",
        "Configuration file generated:".green(),
        path.blue()
    );
    Ok(())
}

fn confirm_overwrite(path: &str) -> Result<bool, CliError> {
    print!(
        "{} {} {}",
        "File already exists:".yellow(),
        path.blue(),
        "Overwrite? [y/N] ".yellow()
    );
    io::stdout()
        .flush()
        .map_err(|e| CliError::CommandError(e.to_string()))?;

    let mut input = String::new();
    io::stdin()
        .lock()
        .read_line(&mut input)
        .map_err(|e| CliError::CommandError(e.to_string()))?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
