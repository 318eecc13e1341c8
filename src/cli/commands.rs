//! CLI command implementations

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::ListingStore;
use crate::exchange::bybit::BybitClient;
use crate::exchange::listings::{extract_symbol, is_listing_announcement};
use crate::monitor::ListingMonitor;
use crate::report::{self, HistoryAnalytics};
use crate::sources::SnapshotCollector;
use crate::strategy::analyze_snapshot;

fn build_stack(config: &Config) -> Result<(Arc<BybitClient>, Arc<ListingStore>, SnapshotCollector)> {
    let bybit = Arc::new(BybitClient::new(
        config.exchange.base_url.clone(),
        Duration::from_millis(config.exchange.request_timeout_ms),
    ));
    let store = Arc::new(
        ListingStore::open(&config.database.path)
            .with_context(|| format!("Failed to open database at {}", config.database.path))?,
    );
    let collector = SnapshotCollector::new(config, bybit.clone(), store.clone());
    Ok((bybit, store, collector))
}

fn normalize_symbol(symbol: &str) -> String {
    let upper = symbol.trim().to_uppercase();
    if upper.ends_with("USDT") {
        upper
    } else {
        format!("{upper}USDT")
    }
}

/// Run the listing monitor until Ctrl-C
pub async fn monitor(config: &Config) -> Result<()> {
    info!("Starting Bybit listing monitor...");
    info!(
        poll_interval_secs = config.monitor.poll_interval_secs,
        "polling announcement feed"
    );

    let (bybit, store, collector) = build_stack(config)?;
    let mut monitor = ListingMonitor::new(config, bybit, collector, store);

    tokio::select! {
        result = monitor.run() => {
            result.map_err(Into::into)
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}

/// Analyze a single symbol on demand
pub async fn analyze(config: &Config, symbol: &str, no_store: bool) -> Result<()> {
    let symbol = normalize_symbol(symbol);
    let (bybit, store, collector) = build_stack(config)?;

    println!("\n🔔 ANALYZING {symbol}");
    println!("{}", "-".repeat(44));

    match bybit.get_ticker(&symbol).await {
        Ok(Some(ticker)) => {
            if let Some(price) = ticker.last_price() {
                println!("Current Price: {price:.8} USDT");
            }
            if let Some(turnover) = ticker.turnover_24h() {
                println!("24h Turnover: {turnover:.2} USDT");
            }
        }
        Ok(None) => println!("Symbol not trading yet on Bybit spot"),
        Err(e) => warn!(error = %e, "ticker lookup failed"),
    }

    let snapshot = collector.collect(&symbol, Utc::now()).await;
    let analysis = analyze_snapshot(&snapshot);

    if !no_store {
        store
            .insert_analysis(&analysis, &snapshot)
            .context("Failed to persist analysis")?;
    }

    report::print_listing_report(&analysis, &snapshot);
    Ok(())
}

/// Analyze every listing announced over the past `days` and print a summary
pub async fn history(config: &Config, days: i64) -> Result<()> {
    let (bybit, _store, collector) = build_stack(config)?;

    let announcements = bybit
        .get_announcements(config.exchange.announcement_limit)
        .await
        .context("Failed to fetch announcements")?;

    println!("\n🔍 LISTINGS ANALYSIS (LAST {days} DAYS)");
    println!("{}", "=".repeat(44));

    let cutoff = Utc::now() - ChronoDuration::days(days);
    let mut processed: HashSet<String> = HashSet::new();
    let mut analytics = HistoryAnalytics::default();

    for announcement in &announcements {
        if announcement.announced_at() < cutoff {
            continue;
        }
        if !is_listing_announcement(&announcement.title) {
            continue;
        }
        let Some(symbol) = extract_symbol(&announcement.title) else {
            continue;
        };
        if !processed.insert(symbol.clone()) {
            continue;
        }

        println!(
            "\n📌 {} ({})",
            symbol,
            announcement.announced_at().format("%Y-%m-%d %H:%M")
        );

        let snapshot = collector.collect(&symbol, announcement.announced_at()).await;
        let analysis = analyze_snapshot(&snapshot);
        analytics.record(&analysis, &snapshot);

        report::print_strategy_block(analysis.strategy, &analysis.parameters);

        // Stay polite to the shared providers
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    if processed.is_empty() {
        println!("\n❌ No new listings found in the window");
    } else {
        analytics.print_summary();
    }

    Ok(())
}

/// Show recently analyzed listings from the store
pub async fn recent(config: &Config, limit: usize) -> Result<()> {
    let store = ListingStore::open(&config.database.path)
        .with_context(|| format!("Failed to open database at {}", config.database.path))?;

    let records = store.recent_records(limit)?;
    if records.is_empty() {
        println!("No analyzed listings stored yet");
        return Ok(());
    }

    println!("\nLast {} analyzed listings:", records.len());
    println!("{}", "-".repeat(72));
    for record in records {
        println!(
            "{:<16} {}  {:<26} composite {:>5.1}  lev {}x{}",
            record.symbol,
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.strategy.display_name(),
            record.composite_score,
            record.leverage,
            if record.recovery_mode { "  ✨" } else { "" },
        );
    }
    println!("{}", "-".repeat(72));
    Ok(())
}

/// Show the active configuration with secrets masked
pub fn show_config(config: &Config) -> Result<()> {
    let mut masked = config.clone();
    for secret in [
        &mut masked.providers.coingecko.api_key,
        &mut masked.providers.coinmarketcap.api_key,
        &mut masked.providers.github.token,
        &mut masked.providers.social.twitter_bearer_token,
    ] {
        if !secret.is_empty() {
            *secret = "***".to_string();
        }
    }

    println!("{masked:#?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("abc"), "ABCUSDT");
        assert_eq!(normalize_symbol("ABCUSDT"), "ABCUSDT");
        assert_eq!(normalize_symbol(" doge "), "DOGEUSDT");
    }
}
