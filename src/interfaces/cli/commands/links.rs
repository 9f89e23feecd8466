//! Link commands: shorten, batch, resolve, list, delete, ping

use std::collections::HashMap;
use std::sync::Arc;

use colored::Colorize;

use crate::deletion::{DeleteAggregator, DeleteSink, StoreSink};
use crate::errors::ShortenerError;
use crate::interfaces::cli::CliError;
use crate::services::LinkShortener;
use crate::utils::{short_url, validate_url};

pub async fn shorten_link(
    shortener: &LinkShortener,
    base_url: &str,
    url: String,
    owner: String,
) -> Result<(), CliError> {
    let url = validate_url(&url)?;
    let outcome = shortener.shorten(&url, &owner).await?;

    if outcome.conflict {
        println!(
            "{} Already shortened: {} -> {}",
            "ℹ".bold().blue(),
            short_url(base_url, &outcome.short_id).cyan(),
            url.blue().underline()
        );
    } else {
        println!(
            "{} Shortened: {} -> {}",
            "✓".bold().green(),
            short_url(base_url, &outcome.short_id).cyan(),
            url.blue().underline()
        );
    }
    Ok(())
}

/// 关联 id 取参数下标，按输入顺序输出
pub async fn shorten_batch(
    shortener: &LinkShortener,
    base_url: &str,
    urls: Vec<String>,
    owner: String,
) -> Result<(), CliError> {
    let mut input = HashMap::with_capacity(urls.len());
    for (index, url) in urls.iter().enumerate() {
        input.insert(index.to_string(), validate_url(url)?);
    }

    let ids = shortener.shorten_batch(&owner, &input).await?;

    for index in 0..urls.len() {
        let key = index.to_string();
        if let (Some(short_id), Some(url)) = (ids.get(&key), input.get(&key)) {
            println!(
                "  {} -> {}",
                short_url(base_url, short_id).cyan(),
                url.blue().underline()
            );
        }
    }
    println!(
        "{} Shortened {} URLs",
        "✓".bold().green(),
        ids.len().to_string().green()
    );
    Ok(())
}

pub async fn resolve_link(shortener: &LinkShortener, short_id: String) -> Result<(), CliError> {
    match shortener.retrieve(&short_id).await {
        Ok(url) => {
            println!("{} {} -> {}", "✓".bold().green(), short_id.cyan(), url.blue().underline());
            Ok(())
        }
        Err(ShortenerError::Deleted(_)) => {
            println!("{} {} has been deleted", "✗".bold().red(), short_id.cyan());
            Err(CliError::CommandError(format!("'{}' is gone", short_id)))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn list_links(
    shortener: &LinkShortener,
    base_url: &str,
    owner: String,
) -> Result<(), CliError> {
    let links = shortener.list_owned(&owner).await?;

    if links.is_empty() {
        println!("{} No short links found for {}", "ℹ".bold().blue(), owner.magenta());
        return Ok(());
    }

    println!("{}", format!("Short links of {}:", owner).bold().green());
    println!();
    for link in &links {
        println!(
            "  {} -> {}",
            short_url(base_url, &link.short_id).cyan(),
            link.original_url.blue().underline()
        );
    }
    println!();
    println!(
        "{} Total {} short links",
        "ℹ".bold().blue(),
        links.len().to_string().green()
    );
    Ok(())
}

/// 经由删除聚合器提交，停止时等待最终刷新
pub async fn delete_links(
    shortener: &LinkShortener,
    aggregator_settings: crate::deletion::DeleterSettings,
    owner: String,
    short_ids: Vec<String>,
) -> Result<(), CliError> {
    let sink: Arc<dyn DeleteSink> = Arc::new(StoreSink::new(Arc::clone(shortener.store())));
    let aggregator = DeleteAggregator::spawn(sink, aggregator_settings);

    let count = short_ids.len();
    let submitted = aggregator.submit(&owner, short_ids).await;
    aggregator.stop().await;
    submitted?;

    println!(
        "{} Submitted {} ids for deletion (owner {})",
        "✓".bold().green(),
        count.to_string().green(),
        owner.magenta()
    );
    Ok(())
}

pub async fn ping_storage(shortener: &LinkShortener) -> Result<(), CliError> {
    let backend = shortener.store().backend_name().to_string();
    match shortener.ping().await {
        Ok(()) => {
            println!("{} {} is reachable", "✓".bold().green(), backend.cyan());
            Ok(())
        }
        Err(e) => {
            println!("{} {}: {}", "✗".bold().red(), backend.cyan(), e.message());
            Err(e.into())
        }
    }
}
