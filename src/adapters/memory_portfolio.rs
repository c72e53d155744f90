//! In-memory holdings store.
//!
//! The reference store for the core and tests; persistence technology is a
//! collaborator concern and lives behind the same trait.

use std::collections::HashMap;

use crate::domain::error::TrendscoreError;
use crate::ports::portfolio_port::PortfolioStore;

#[derive(Debug, Default)]
pub struct InMemoryPortfolioStore {
    holdings: HashMap<String, f64>,
}

impl InMemoryPortfolioStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PortfolioStore for InMemoryPortfolioStore {
    fn get(&self, code: &str) -> Option<f64> {
        self.holdings.get(code).copied()
    }

    fn set(&mut self, code: &str, cost_basis: f64) -> Result<(), TrendscoreError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(TrendscoreError::InvalidInput {
                reason: "holding symbol must not be empty".into(),
            });
        }
        if !cost_basis.is_finite() || cost_basis <= 0.0 {
            return Err(TrendscoreError::InvalidInput {
                reason: format!("cost basis must be positive, got {cost_basis}"),
            });
        }
        self.holdings.insert(code.to_string(), cost_basis);
        Ok(())
    }

    fn remove(&mut self, code: &str) -> Option<f64> {
        self.holdings.remove(code)
    }

    fn list(&self) -> Vec<(String, f64)> {
        let mut all: Vec<(String, f64)> = self
            .holdings
            .iter()
            .map(|(code, &cost)| (code.clone(), cost))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut store = InMemoryPortfolioStore::new();
        store.set("2330", 580.0).unwrap();
        assert_eq!(store.get("2330"), Some(580.0));
        assert_eq!(store.get("2317"), None);
    }

    #[test]
    fn set_overwrites() {
        let mut store = InMemoryPortfolioStore::new();
        store.set("2330", 580.0).unwrap();
        store.set("2330", 600.0).unwrap();
        assert_eq!(store.get("2330"), Some(600.0));
    }

    #[test]
    fn rejects_empty_symbol() {
        let mut store = InMemoryPortfolioStore::new();
        let err = store.set("  ", 100.0).unwrap_err();
        assert!(matches!(err, TrendscoreError::InvalidInput { .. }));
    }

    #[test]
    fn rejects_non_positive_cost_basis() {
        let mut store = InMemoryPortfolioStore::new();
        assert!(store.set("2330", 0.0).is_err());
        assert!(store.set("2330", -5.0).is_err());
        assert!(store.set("2330", f64::NAN).is_err());
        assert_eq!(store.get("2330"), None);
    }

    #[test]
    fn remove_returns_previous_value() {
        let mut store = InMemoryPortfolioStore::new();
        store.set("2330", 580.0).unwrap();
        assert_eq!(store.remove("2330"), Some(580.0));
        assert_eq!(store.remove("2330"), None);
    }

    #[test]
    fn list_is_sorted() {
        let mut store = InMemoryPortfolioStore::new();
        store.set("2454", 900.0).unwrap();
        store.set("2330", 580.0).unwrap();
        let all = store.list();
        assert_eq!(all[0].0, "2330");
        assert_eq!(all[1].0, "2454");
    }
}
