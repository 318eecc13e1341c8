//! Operator-facing report rendering
//!
//! Per-listing reports for the monitor/analyze commands and the summary
//! analytics for the history command. This is command output, so it prints
//! directly instead of going through tracing.

use std::collections::HashMap;

use crate::scoring::SourceKind;
use crate::sources::TokenSnapshot;
use crate::strategy::{AdjustedParameters, ListingAnalysis, StrategyKind};

/// 10-segment bar for a 0-100 score
fn score_bar(score: f64) -> String {
    let filled = ((score / 10.0) as usize).min(10);
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

fn format_millions(value: f64) -> String {
    format!("${:.1}M", value / 1e6)
}

fn source_present(snapshot: &TokenSnapshot, kind: SourceKind) -> bool {
    match kind {
        SourceKind::Market => snapshot.market.is_some(),
        SourceKind::Social => snapshot.social.is_some(),
        SourceKind::Dex => snapshot.dex.is_some(),
        SourceKind::Historical => snapshot.historical.is_some(),
        SourceKind::Github => snapshot.github.is_some(),
        SourceKind::Trends => snapshot.trends.is_some(),
        SourceKind::Orderbook => snapshot.orderbook.is_some(),
    }
}

/// Print the full analysis block for one listing
pub fn print_listing_report(analysis: &ListingAnalysis, snapshot: &TokenSnapshot) {
    println!("\n{}", "=".repeat(44));
    println!("🚨 NEW LISTING: {}", analysis.symbol);
    println!("{}", "=".repeat(44));

    print!("📊 Data Sources:");
    for kind in SourceKind::ALL {
        let mark = if source_present(snapshot, kind) {
            "✓"
        } else {
            "✗"
        };
        print!("  {}{}", kind.label(), mark);
    }
    println!();

    if let Some(market) = &snapshot.market {
        if market.market_cap > 0.0 || market.volume_24h > 0.0 {
            println!(
                "💰 Cap: {} | Vol: {}",
                format_millions(market.market_cap),
                format_millions(market.volume_24h)
            );
        }
    }

    println!("\n📈 Component Scores:");
    for (kind, score) in analysis.breakdown.subscores.entries() {
        match score {
            Some(score) => {
                println!("{:<11} [{}] {:.0}", kind.label(), score_bar(score), score)
            }
            None => println!("{:<11} [{}] n/a", kind.label(), "·".repeat(10)),
        }
    }
    println!(
        "composite {:.1} | volatility {:.1} | hype {:.1}",
        analysis.breakdown.composite, analysis.breakdown.volatility, analysis.breakdown.hype
    );

    print_strategy_block(analysis.strategy, &analysis.parameters);
    println!("{}", "=".repeat(44));
}

/// Print the selected strategy with its adjusted parameters
pub fn print_strategy_block(strategy: StrategyKind, params: &AdjustedParameters) {
    println!(
        "\n🎯 {} ({} Risk)",
        strategy.display_name(),
        strategy.risk_level()
    );
    println!(
        "⚙️  Hold: {} | Leverage: {}x",
        params.hold_time, params.leverage
    );
    let targets: Vec<String> = params
        .take_profits
        .iter()
        .map(|target| format!("{target:.1}%"))
        .collect();
    println!(
        "   TP: {} | SL: {:.1}% | Trail: {:.1}%",
        targets.join(", "),
        params.stop_loss,
        params.trailing_stop
    );
    if params.recovery_mode {
        println!("   ✨ Recovery Mode Enabled");
    }
}

/// Aggregated statistics for the history command
#[derive(Debug, Default)]
pub struct HistoryAnalytics {
    pub total_tokens: usize,
    pub with_market_data: usize,
    pub without_market_data: usize,
    pub strategies: HashMap<StrategyKind, usize>,
    pub component_scores: HashMap<SourceKind, Vec<f64>>,
    pub increased_tp: usize,
    pub decreased_tp: usize,
    pub tightened_sl: usize,
    pub widened_sl: usize,
    pub increased_leverage: usize,
    pub decreased_leverage: usize,
    pub recovery_mode: usize,
}

impl HistoryAnalytics {
    pub fn record(&mut self, analysis: &ListingAnalysis, snapshot: &TokenSnapshot) {
        self.total_tokens += 1;
        if snapshot.market.is_some() {
            self.with_market_data += 1;
        } else {
            self.without_market_data += 1;
        }

        *self.strategies.entry(analysis.strategy).or_insert(0) += 1;

        for (kind, score) in analysis.breakdown.subscores.entries() {
            if let Some(score) = score {
                self.component_scores.entry(kind).or_default().push(score);
            }
        }

        let base = analysis.strategy.params();
        let params = &analysis.parameters;

        if let (Some(adjusted), Some(original)) =
            (params.take_profits.first(), base.take_profits.first())
        {
            if adjusted > original {
                self.increased_tp += 1;
            } else if adjusted < original {
                self.decreased_tp += 1;
            }
        }

        if params.stop_loss.abs() < base.stop_loss.abs() {
            self.tightened_sl += 1;
        } else if params.stop_loss.abs() > base.stop_loss.abs() {
            self.widened_sl += 1;
        }

        if params.leverage > base.leverage {
            self.increased_leverage += 1;
        } else if params.leverage < base.leverage {
            self.decreased_leverage += 1;
        }

        if params.recovery_mode {
            self.recovery_mode += 1;
        }
    }

    /// Print the summary block after a history run
    pub fn print_summary(&self) {
        println!("\n📊 SUMMARY");
        println!("{}", "-".repeat(44));
        println!("Total Tokens: {}", self.total_tokens);
        println!(
            "With Market Data: {} | Without: {}",
            self.with_market_data, self.without_market_data
        );

        if self.total_tokens == 0 {
            println!("{}", "-".repeat(44));
            return;
        }
        let total = self.total_tokens as f64;

        println!("\n📈 Strategy Distribution:");
        for kind in StrategyKind::ALL {
            let count = self.strategies.get(&kind).copied().unwrap_or(0);
            if count > 0 {
                let pct = count as f64 / total * 100.0;
                println!("{:<26} {:>2} ({:>4.1}%)", kind.display_name(), count, pct);
            }
        }

        println!("\n⚠️  Risk Levels:");
        for kind in StrategyKind::ALL {
            let count = self.strategies.get(&kind).copied().unwrap_or(0);
            if count > 0 {
                let pct = count as f64 / total * 100.0;
                println!("{:<8} {:>2} ({:>4.1}%)", kind.risk_level(), count, pct);
            }
        }

        println!("\n📉 Mean Component Scores:");
        for kind in SourceKind::ALL {
            if let Some(scores) = self.component_scores.get(&kind) {
                if !scores.is_empty() {
                    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
                    println!("{:<11} {:>5.1} ({} samples)", kind.label(), mean, scores.len());
                }
            }
        }

        println!("\n🔧 Parameter Adjustments:");
        println!(
            "TP up {} / down {} | SL tightened {} / widened {}",
            self.increased_tp, self.decreased_tp, self.tightened_sl, self.widened_sl
        );
        println!(
            "Leverage up {} / down {} | Recovery mode {}",
            self.increased_leverage, self.decreased_leverage, self.recovery_mode
        );
        println!("{}", "-".repeat(44));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{MarketMetrics, SocialMetrics, TrendsMetrics};
    use crate::strategy::analyze_snapshot;
    use chrono::Utc;

    #[test]
    fn test_score_bar_bounds() {
        assert_eq!(score_bar(0.0), "░░░░░░░░░░");
        assert_eq!(score_bar(100.0), "██████████");
        assert_eq!(score_bar(55.0), "█████░░░░░");
        // Out-of-range scores stay inside ten segments
        assert_eq!(score_bar(400.0).chars().count(), 10);
    }

    #[test]
    fn test_analytics_counts_strategies_and_data() {
        let mut analytics = HistoryAnalytics::default();

        let empty = TokenSnapshot::empty("AUSDT", Utc::now());
        analytics.record(&analyze_snapshot(&empty), &empty);

        let mut with_market = TokenSnapshot::empty("BUSDT", Utc::now());
        with_market.market = Some(MarketMetrics {
            market_cap: 2_000_000.0,
            volume_24h: 400_000.0,
            price: 0.2,
            price_change_24h: 4.0,
            total_supply: 1e9,
            circulating_supply: None,
            max_supply: None,
            exchanges_listed: 1,
        });
        analytics.record(&analyze_snapshot(&with_market), &with_market);

        assert_eq!(analytics.total_tokens, 2);
        assert_eq!(analytics.with_market_data, 1);
        assert_eq!(analytics.without_market_data, 1);
        assert_eq!(analytics.strategies.values().sum::<usize>(), 2);
    }

    #[test]
    fn test_analytics_tracks_tp_adjustments() {
        let mut analytics = HistoryAnalytics::default();

        // High hype scales take profits up
        let mut hyped = TokenSnapshot::empty("CUSDT", Utc::now());
        hyped.social = Some(SocialMetrics {
            hype_score: 95.0,
            sentiment: 0.0,
            community_strength: 0.0,
            growth_rate: 0.0,
        });
        hyped.trends = Some(TrendsMetrics {
            interest_over_time: 95.0,
        });
        let analysis = analyze_snapshot(&hyped);
        analytics.record(&analysis, &hyped);

        assert_eq!(analytics.increased_tp, 1);
        assert_eq!(analytics.decreased_tp, 0);
    }
}
