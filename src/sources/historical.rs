//! Historical-pattern analysis over previously stored listings
//!
//! New listings rarely have a history of their own, so the analyzer reads
//! outcome statistics from the most recent stored listing records: how often
//! recent listings moved up, their mean 24h move, and how calm those moves
//! were. Below a minimum sample size it reports no data.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::db::{ListingRecord, ListingStore};
use crate::error::Result;
use crate::sources::{HistoricalMetrics, MetricSource};

/// Fewer samples than this yields no metrics
const MIN_DATA_POINTS: usize = 10;
/// Records considered per analysis
const RECORD_WINDOW: usize = 30;

pub struct HistoricalAnalyzer {
    store: Arc<ListingStore>,
}

impl HistoricalAnalyzer {
    pub fn new(store: Arc<ListingStore>) -> Self {
        Self { store }
    }

    pub fn fetch_historical(&self) -> Result<Option<HistoricalMetrics>> {
        let records = self.store.recent_records(RECORD_WINDOW)?;
        Ok(analyze_records(&records))
    }
}

/// Outcome statistics over a window of listing records
pub fn analyze_records(records: &[ListingRecord]) -> Option<HistoricalMetrics> {
    let changes: Vec<f64> = records
        .iter()
        .filter_map(|record| record.price_change_24h)
        .filter(|change| change.is_finite())
        .collect();

    if changes.len() < MIN_DATA_POINTS {
        return None;
    }

    let total = changes.len() as f64;
    let positive = changes.iter().filter(|change| **change > 0.0).count() as f64;
    let success_rate = positive / total * 100.0;

    let avg_roi_score = changes.iter().sum::<f64>() / total;

    let mean_magnitude = changes.iter().map(|change| change.abs()).sum::<f64>() / total;
    let stability_score = (100.0 - mean_magnitude).clamp(0.0, 100.0);

    Some(HistoricalMetrics {
        success_rate,
        avg_roi_score,
        stability_score,
    })
}

#[async_trait]
impl MetricSource for HistoricalAnalyzer {
    type Bag = HistoricalMetrics;

    fn name(&self) -> &'static str {
        "historical"
    }

    async fn fetch(
        &self,
        _symbol: &str,
        _listed_at: DateTime<Utc>,
    ) -> Result<Option<HistoricalMetrics>> {
        self.fetch_historical()
    }
}
