//! Listing monitor loop
//!
//! Polls the announcement feed on an interval, turns unseen listing
//! announcements into events, and runs each event through collection,
//! analysis, persistence and reporting. Poll errors are logged and the loop
//! keeps going; an analysis, once started, always runs to completion.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::ListingStore;
use crate::error::Result;
use crate::exchange::bybit::BybitClient;
use crate::exchange::listings::{ListingEvent, ListingTracker};
use crate::report;
use crate::sources::SnapshotCollector;
use crate::strategy::analyze_snapshot;

pub struct ListingMonitor {
    bybit: Arc<BybitClient>,
    collector: SnapshotCollector,
    store: Arc<ListingStore>,
    tracker: ListingTracker,
    poll_interval: Duration,
    announcement_limit: u32,
}

impl ListingMonitor {
    pub fn new(
        config: &Config,
        bybit: Arc<BybitClient>,
        collector: SnapshotCollector,
        store: Arc<ListingStore>,
    ) -> Self {
        Self {
            bybit,
            collector,
            store,
            tracker: ListingTracker::new(),
            poll_interval: Duration::from_secs(config.monitor.poll_interval_secs),
            announcement_limit: config.exchange.announcement_limit,
        }
    }

    /// Seed the tracker with everything that already trades or was already
    /// announced, so only genuinely new listings fire
    pub async fn initialize(&mut self) -> Result<()> {
        match self.bybit.get_tickers().await {
            Ok(tickers) => {
                self.tracker.seed_symbols(
                    tickers
                        .into_iter()
                        .map(|ticker| ticker.symbol)
                        .filter(|symbol| symbol.ends_with("USDT")),
                );
                info!(
                    known_symbols = self.tracker.known_symbol_count(),
                    "seeded known trading pairs"
                );
            }
            Err(e) => warn!(error = %e, "could not seed known symbols"),
        }

        match self.bybit.get_announcements(self.announcement_limit).await {
            Ok(announcements) => {
                // Baseline pass: absorb without analyzing
                let baseline = announcements
                    .iter()
                    .filter_map(|announcement| self.tracker.observe(announcement))
                    .count();
                info!(baseline, "absorbed existing announcements");
            }
            Err(e) => warn!(error = %e, "could not fetch baseline announcements"),
        }

        info!("listing monitor initialized, waiting for new listings");
        Ok(())
    }

    /// Run until cancelled
    pub async fn run(&mut self) -> Result<()> {
        self.initialize().await?;

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.poll_once().await {
                warn!(error = %e, "announcement poll failed");
            }
        }
    }

    /// One poll pass; returns the number of new listings handled
    pub async fn poll_once(&mut self) -> Result<usize> {
        let announcements = self.bybit.get_announcements(self.announcement_limit).await?;

        let events: Vec<ListingEvent> = announcements
            .iter()
            .filter_map(|announcement| self.tracker.observe(announcement))
            .collect();

        for event in &events {
            self.handle_listing(event).await;
        }

        Ok(events.len())
    }

    async fn handle_listing(&self, event: &ListingEvent) {
        info!(symbol = %event.symbol, title = %event.title, "new listing detected");

        let snapshot = self.collector.collect(&event.symbol, event.announced_at).await;
        let analysis = analyze_snapshot(&snapshot);

        if let Err(e) = self.store.insert_analysis(&analysis, &snapshot) {
            warn!(symbol = %event.symbol, error = %e, "failed to persist analysis");
        }

        report::print_listing_report(&analysis, &snapshot);
    }
}
