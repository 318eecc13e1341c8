//! Multi-source scoring pipeline
//!
//! Seven pure sub-scorers map each metric bag (or its absence) to a score in
//! [0, 100] or "unknown". The composite scorer substitutes the neutral
//! default for unknowns in one explicit step, then derives the volatility
//! and hype indicators consumed by strategy selection.

pub mod composite;
pub mod meme;
pub mod subscores;

pub use composite::{
    composite_score, hype_indicator, volatility_indicator, ScoreBreakdown, DEFAULT_HYPE,
    DEFAULT_VOLATILITY, NEUTRAL_SUBSCORE,
};
pub use meme::is_meme_symbol;
pub use subscores::{SourceKind, SubScores};
