//! SQLite persistence for analyzed listings
//!
//! One flat row per analyzed listing: the scoring columns queried by the
//! historical analyzer and the recent-listings view, plus JSON blobs with
//! the full snapshot and breakdown for later inspection.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::sources::TokenSnapshot;
use crate::strategy::{ListingAnalysis, StrategyKind};

/// Flat view over one stored listing row
#[derive(Debug, Clone)]
pub struct ListingRecord {
    pub id: i64,
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub strategy: StrategyKind,
    pub composite_score: f64,
    pub volatility: f64,
    pub hype: f64,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub stop_loss: f64,
    pub leverage: i64,
    pub recovery_mode: bool,
}

/// Listing store over a single SQLite connection
pub struct ListingStore {
    conn: Mutex<Connection>,
}

impl ListingStore {
    /// Open (or create) the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS listing_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                strategy TEXT NOT NULL,
                market_cap REAL,
                volume_24h REAL,
                price REAL,
                price_change_24h REAL,
                total_supply REAL,
                circulating_supply REAL,
                max_supply REAL,
                social_score REAL,
                sentiment_score REAL,
                community_strength REAL,
                growth_rate REAL,
                spread REAL,
                depth_score REAL,
                buy_pressure REAL,
                volatility_risk REAL,
                exchange_count INTEGER,
                composite_score REAL NOT NULL,
                volatility REAL NOT NULL,
                hype REAL NOT NULL,
                take_profits TEXT NOT NULL,
                stop_loss REAL NOT NULL,
                leverage INTEGER NOT NULL,
                trailing_stop REAL NOT NULL,
                recovery_mode INTEGER NOT NULL,
                snapshot_json TEXT NOT NULL,
                breakdown_json TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_listing_symbol_time
             ON listing_data(symbol, timestamp DESC)",
            [],
        )?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned mutex means a prior writer panicked mid-statement;
        // the connection itself is still usable
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Persist one analysis together with the snapshot it was derived from
    pub fn insert_analysis(
        &self,
        analysis: &ListingAnalysis,
        snapshot: &TokenSnapshot,
    ) -> Result<i64> {
        let take_profits = serde_json::to_string(&analysis.parameters.take_profits)?;
        let snapshot_json = serde_json::to_string(snapshot)?;
        let breakdown_json = serde_json::to_string(&analysis.breakdown)?;

        let market = snapshot.market.as_ref();
        let social = snapshot.social.as_ref();
        let orderbook = snapshot.orderbook.as_ref();

        let conn = self.lock();
        conn.execute(
            "INSERT INTO listing_data (
                symbol, timestamp, strategy,
                market_cap, volume_24h, price, price_change_24h,
                total_supply, circulating_supply, max_supply,
                social_score, sentiment_score, community_strength, growth_rate,
                spread, depth_score, buy_pressure, volatility_risk,
                exchange_count,
                composite_score, volatility, hype,
                take_profits, stop_loss, leverage, trailing_stop, recovery_mode,
                snapshot_json, breakdown_json
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19,
                ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29
            )",
            params![
                analysis.symbol,
                analysis.analyzed_at.to_rfc3339(),
                analysis.strategy.as_str(),
                market.map(|m| m.market_cap),
                market.map(|m| m.volume_24h),
                market.map(|m| m.price),
                market.map(|m| m.price_change_24h),
                market.map(|m| m.total_supply),
                market.and_then(|m| m.circulating_supply),
                market.and_then(|m| m.max_supply),
                social.map(|s| s.hype_score),
                social.map(|s| s.sentiment),
                social.map(|s| s.community_strength),
                social.map(|s| s.growth_rate),
                orderbook.map(|o| o.spread_pct),
                orderbook.map(|o| o.depth_score),
                orderbook.map(|o| o.buy_pressure),
                orderbook.map(|o| o.volatility_risk),
                market.map(|m| i64::from(m.exchanges_listed)),
                analysis.breakdown.composite,
                analysis.breakdown.volatility,
                analysis.breakdown.hype,
                take_profits,
                analysis.parameters.stop_loss,
                i64::from(analysis.parameters.leverage),
                analysis.parameters.trailing_stop,
                analysis.parameters.recovery_mode,
                snapshot_json,
                breakdown_json,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Most recent stored record for a symbol
    pub fn latest_for_symbol(&self, symbol: &str) -> Result<Option<ListingRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, symbol, timestamp, strategy, composite_score, volatility, hype,
                    market_cap, volume_24h, price_change_24h, stop_loss, leverage, recovery_mode
             FROM listing_data
             WHERE symbol = ?1
             ORDER BY timestamp DESC
             LIMIT 1",
        )?;
        let mut rows = stmt.query_map(params![symbol], row_to_record)?;
        rows.next().transpose().map_err(Error::from)
    }

    /// Most recent records across all symbols, newest first
    pub fn recent_records(&self, limit: usize) -> Result<Vec<ListingRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, symbol, timestamp, strategy, composite_score, volatility, hype,
                    market_cap, volume_24h, price_change_24h, stop_loss, leverage, recovery_mode
             FROM listing_data
             ORDER BY timestamp DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM listing_data", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ListingRecord> {
    let timestamp: String = row.get(2)?;
    let strategy: String = row.get(3)?;
    Ok(ListingRecord {
        id: row.get(0)?,
        symbol: row.get(1)?,
        timestamp: DateTime::parse_from_rfc3339(&timestamp)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        strategy: StrategyKind::from_str_name(&strategy).unwrap_or(StrategyKind::BalancedPump),
        composite_score: row.get(4)?,
        volatility: row.get(5)?,
        hype: row.get(6)?,
        market_cap: row.get(7)?,
        volume_24h: row.get(8)?,
        price_change_24h: row.get(9)?,
        stop_loss: row.get(10)?,
        leverage: row.get(11)?,
        recovery_mode: row.get(12)?,
    })
}
