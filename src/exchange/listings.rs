//! Listing-announcement parsing and tracking
//!
//! Bybit announces listings as free-form titles ("New Listing: XUSDT ...",
//! "Bybit Will List X (Token) ..."). The tracker turns the announcement
//! feed into at-most-once listing events, deduplicating both announcements
//! and symbols.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::bybit::Announcement;

static SYMBOL_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn symbol_patterns() -> &'static [Regex] {
    SYMBOL_PATTERNS.get_or_init(|| {
        [
            // ": BTCUSDT" or ": BTC/USDT" (checked first, the colon anchors
            // the actual pair in titles that mention USDT twice)
            r":\s*([A-Z0-9]+)/?USDT",
            // "BTCUSDT" or "BTC/USDT" anywhere in the title
            r"([A-Z0-9]+)/?USDT",
            // "Listing of BTC on ..."
            r"OF\s+([A-Z0-9]+)\s+ON",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("invalid symbol pattern"))
        .collect()
    })
}

/// Extract the listed pair from an announcement title
pub fn extract_symbol(title: &str) -> Option<String> {
    let upper = title.to_uppercase();
    for pattern in symbol_patterns() {
        if let Some(captures) = pattern.captures(&upper) {
            if let Some(base) = captures.get(1) {
                return Some(format!("{}USDT", base.as_str()));
            }
        }
    }
    None
}

/// Check whether a title announces a USDT listing
pub fn is_listing_announcement(title: &str) -> bool {
    let upper = title.to_uppercase();
    (upper.contains("LISTING") || upper.contains("WILL LIST")) && upper.contains("USDT")
}

/// A newly detected listing
#[derive(Debug, Clone)]
pub struct ListingEvent {
    pub symbol: String,
    pub announced_at: DateTime<Utc>,
    pub title: String,
}

/// Deduplicating view over the announcement feed
#[derive(Debug, Default)]
pub struct ListingTracker {
    known_symbols: HashSet<String>,
    seen_announcements: HashSet<String>,
}

impl ListingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark symbols that already trade so they never fire as new listings
    pub fn seed_symbols<I>(&mut self, symbols: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.known_symbols.extend(symbols);
    }

    pub fn known_symbol_count(&self) -> usize {
        self.known_symbols.len()
    }

    /// Process one announcement, returning a listing event the first time a
    /// new-listing title for an unknown symbol is seen
    pub fn observe(&mut self, announcement: &Announcement) -> Option<ListingEvent> {
        let key = if announcement.url.is_empty() {
            format!("{}:{}", announcement.date_timestamp, announcement.title)
        } else {
            announcement.url.clone()
        };
        if !self.seen_announcements.insert(key) {
            return None;
        }

        if !is_listing_announcement(&announcement.title) {
            return None;
        }

        let symbol = extract_symbol(&announcement.title)?;
        if !self.known_symbols.insert(symbol.clone()) {
            return None;
        }

        Some(ListingEvent {
            symbol,
            announced_at: announcement.announced_at(),
            title: announcement.title.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announcement(title: &str, url: &str, ts: i64) -> Announcement {
        Announcement {
            title: title.to_string(),
            description: String::new(),
            url: url.to_string(),
            date_timestamp: ts,
        }
    }

    #[test]
    fn test_extract_plain_pair() {
        assert_eq!(
            extract_symbol("New Listing: AVLUSDT Perpetual Contract"),
            Some("AVLUSDT".to_string())
        );
    }

    #[test]
    fn test_extract_slash_pair() {
        assert_eq!(
            extract_symbol("Bybit Will List ABC/USDT in the Innovation Zone"),
            Some("ABCUSDT".to_string())
        );
    }

    #[test]
    fn test_extract_of_on_form() {
        assert_eq!(
            extract_symbol("Listing of XYZ on Bybit Spot"),
            Some("XYZUSDT".to_string())
        );
    }

    #[test]
    fn test_extract_nothing_without_pair() {
        assert_eq!(extract_symbol("Maintenance notice for the weekend"), None);
    }

    #[test]
    fn test_listing_title_detection() {
        assert!(is_listing_announcement("New Listing: ABCUSDT"));
        assert!(is_listing_announcement("Bybit Will List ABC (Token) — ABC/USDT"));
        assert!(!is_listing_announcement("New Listing: ABC Perpetual (USDC)"));
        assert!(!is_listing_announcement("Funding rate adjustments"));
    }

    #[test]
    fn test_tracker_fires_once_per_symbol() {
        let mut tracker = ListingTracker::new();

        let first = announcement("New Listing: ABCUSDT", "https://a/1", 1);
        let event = tracker.observe(&first).expect("first sighting fires");
        assert_eq!(event.symbol, "ABCUSDT");

        // Same announcement again: deduplicated
        assert!(tracker.observe(&first).is_none());

        // Different announcement, same symbol: still deduplicated
        let second = announcement("Reminder — New Listing: ABCUSDT", "https://a/2", 2);
        assert!(tracker.observe(&second).is_none());
    }

    #[test]
    fn test_tracker_ignores_seeded_symbols() {
        let mut tracker = ListingTracker::new();
        tracker.seed_symbols(["BTCUSDT".to_string()]);

        let existing = announcement("New Listing: BTCUSDT (again)", "https://a/3", 3);
        assert!(tracker.observe(&existing).is_none());
        assert_eq!(tracker.known_symbol_count(), 1);
    }

    #[test]
    fn test_tracker_skips_non_listing_titles() {
        let mut tracker = ListingTracker::new();
        let notice = announcement("System upgrade for USDT margin", "https://a/4", 4);
        assert!(tracker.observe(&notice).is_none());
    }
}
