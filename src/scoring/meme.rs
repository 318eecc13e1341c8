//! Meme-name heuristic over exchange symbols

/// Substrings that mark a symbol as a meme/hype token. Matched
/// case-insensitively against the full exchange symbol, so "DOGEUSDT" and
/// "BabyElonUSDT" both trigger.
const MEME_INDICATORS: &[&str] = &[
    "PEPE", "MEME", "DOGE", "SHIB", "BABY", "ELON", "MOON", "SAFE", "INU", "APE",
];

/// Check whether a symbol name looks like a meme token
pub fn is_meme_symbol(symbol: &str) -> bool {
    let upper = symbol.to_uppercase();
    MEME_INDICATORS.iter().any(|marker| upper.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meme_symbols_detected() {
        assert!(is_meme_symbol("DOGEUSDT"));
        assert!(is_meme_symbol("PEPE2USDT"));
        assert!(is_meme_symbol("BABYELONUSDT"));
        assert!(is_meme_symbol("FLOKIINUUSDT"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(is_meme_symbol("dogeusdt"));
        assert!(is_meme_symbol("ShibUsdt"));
    }

    #[test]
    fn test_regular_symbols_pass() {
        assert!(!is_meme_symbol("BTCUSDT"));
        assert!(!is_meme_symbol("ETHUSDT"));
        assert!(!is_meme_symbol("SOLUSDT"));
    }
}
