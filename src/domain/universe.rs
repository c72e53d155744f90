//! Symbol universe parsing and defaults.

use std::collections::HashSet;

use crate::domain::error::TrendscoreError;

/// Fallback list when no universe provider is configured or listing fails.
pub const DEFAULT_SYMBOLS: [&str; 5] = ["2330", "2603", "2317", "2454", "3231"];

/// Default patrol list for holding checks.
pub const DEFAULT_MONITOR_SYMBOLS: [&str; 3] = ["2330", "2317", "2454"];

/// Parse a comma-separated symbol list.
///
/// Tokens are trimmed and uppercased; empty tokens are rejected as invalid
/// input; duplicates are kept once so a batch never double-counts.
pub fn parse_codes(input: &str) -> Result<Vec<String>, TrendscoreError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(TrendscoreError::InvalidInput {
                reason: "empty symbol in code list".into(),
            });
        }
        let code = trimmed.to_uppercase();
        if seen.insert(code.clone()) {
            codes.push(code);
        }
    }

    Ok(codes)
}

pub fn default_symbols() -> Vec<String> {
    DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_codes_basic() {
        let result = parse_codes("2330,2603,2317").unwrap();
        assert_eq!(result, vec!["2330", "2603", "2317"]);
    }

    #[test]
    fn parse_codes_trims_and_uppercases() {
        let result = parse_codes("  2330 , 00631l ,2317  ").unwrap();
        assert_eq!(result, vec!["2330", "00631L", "2317"]);
    }

    #[test]
    fn parse_codes_rejects_empty_token() {
        let result = parse_codes("2330,,2317");
        assert!(matches!(result, Err(TrendscoreError::InvalidInput { .. })));
    }

    #[test]
    fn parse_codes_drops_duplicates() {
        let result = parse_codes("2330,2317,2330").unwrap();
        assert_eq!(result, vec!["2330", "2317"]);
    }

    #[test]
    fn default_list_is_nonempty() {
        assert_eq!(default_symbols().len(), 5);
    }

    #[test]
    fn patrol_list_is_subset_of_defaults() {
        for code in DEFAULT_MONITOR_SYMBOLS {
            assert!(DEFAULT_SYMBOLS.contains(&code));
        }
    }
}
