//! Trading-strategy presets
//!
//! Modeled as an enum tag plus an immutable parameter bundle looked up per
//! tag — selection and adjustment are free functions over the tag, so no
//! behavior lives on the variants themselves.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three strategy presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    AggressivePump,
    BalancedPump,
    Momentum,
}

/// Immutable parameter bundle for one preset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyParams {
    pub hold_time: &'static str,
    /// Ordered take-profit targets, percent
    pub take_profits: Vec<f64>,
    /// Negative percent
    pub stop_loss: f64,
    /// 1-5
    pub leverage: u8,
    /// Percent below peak
    pub trailing_stop: f64,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::AggressivePump,
        StrategyKind::BalancedPump,
        StrategyKind::Momentum,
    ];

    /// Operator-facing strategy name
    pub fn display_name(&self) -> &'static str {
        match self {
            StrategyKind::AggressivePump => "Aggressive Pump Strategy",
            StrategyKind::BalancedPump => "Balanced Pump Strategy",
            StrategyKind::Momentum => "Momentum Strategy",
        }
    }

    /// Stable identifier used in persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::AggressivePump => "aggressive_pump",
            StrategyKind::BalancedPump => "balanced_pump",
            StrategyKind::Momentum => "momentum",
        }
    }

    pub fn from_str_name(name: &str) -> Option<StrategyKind> {
        match name {
            "aggressive_pump" => Some(StrategyKind::AggressivePump),
            "balanced_pump" => Some(StrategyKind::BalancedPump),
            "momentum" => Some(StrategyKind::Momentum),
            _ => None,
        }
    }

    /// Base parameter bundle for this preset
    pub fn params(&self) -> StrategyParams {
        match self {
            StrategyKind::AggressivePump => StrategyParams {
                hold_time: "3-15 minutes",
                take_profits: vec![20.0, 30.0, 50.0],
                stop_loss: -8.0,
                leverage: 5,
                trailing_stop: 10.0,
            },
            StrategyKind::BalancedPump => StrategyParams {
                hold_time: "15-45 minutes",
                take_profits: vec![15.0, 25.0, 40.0],
                stop_loss: -10.0,
                leverage: 3,
                trailing_stop: 15.0,
            },
            StrategyKind::Momentum => StrategyParams {
                hold_time: "1-3 hours",
                take_profits: vec![30.0, 45.0, 70.0],
                stop_loss: -12.0,
                leverage: 3,
                trailing_stop: 20.0,
            },
        }
    }

    /// Widest stop-loss the preset tolerates after adjustment. The adjusted
    /// value's magnitude is clamped back toward this cap, never amplified.
    pub fn stop_loss_cap(&self) -> f64 {
        match self {
            StrategyKind::AggressivePump => -10.0,
            StrategyKind::BalancedPump => -12.0,
            StrategyKind::Momentum => -15.0,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        match self {
            StrategyKind::AggressivePump => RiskLevel::High,
            StrategyKind::BalancedPump => RiskLevel::Medium,
            StrategyKind::Momentum => RiskLevel::Low,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Operator-facing risk bucket per preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_profits_are_ordered() {
        for kind in StrategyKind::ALL {
            let params = kind.params();
            let mut sorted = params.take_profits.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            assert_eq!(params.take_profits, sorted, "{kind} targets out of order");
        }
    }

    #[test]
    fn test_base_stop_loss_is_within_cap() {
        for kind in StrategyKind::ALL {
            let params = kind.params();
            assert!(
                params.stop_loss >= kind.stop_loss_cap(),
                "{kind} base stop loss exceeds its own cap"
            );
            assert!(params.stop_loss < 0.0);
        }
    }

    #[test]
    fn test_base_leverage_in_bounds() {
        for kind in StrategyKind::ALL {
            let leverage = kind.params().leverage;
            assert!((1..=5).contains(&leverage));
        }
    }

    #[test]
    fn test_str_roundtrip() {
        for kind in StrategyKind::ALL {
            assert_eq!(StrategyKind::from_str_name(kind.as_str()), Some(kind));
        }
        assert_eq!(StrategyKind::from_str_name("yolo"), None);
    }
}
