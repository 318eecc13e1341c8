//! Bybit exchange access
//!
//! Public v5 REST endpoints only: announcements, spot tickers and the order
//! book. Announcement titles are parsed into listing events by `listings`.

pub mod bybit;
pub mod listings;

pub use bybit::{Announcement, BookLevel, BybitClient, OrderBook, SpotTicker};
pub use listings::{extract_symbol, is_listing_announcement, ListingEvent, ListingTracker};
