//! Static exchange-rate table shared by the read-path formatter and the
//! write-path normalizer.

use serde::{Deserialize, Serialize};

/// Symbol rendered for codes missing from the table.
pub const FALLBACK_SYMBOL: &str = "$";
/// Base unit every stored amount is denominated in.
pub const BASE_CURRENCY: &str = "USD";

/// Units of `code` per one USD, plus the display symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrencyRate {
    pub code: String,
    pub rate: f64,
    pub symbol: String,
}

impl CurrencyRate {
    pub fn new(code: impl Into<String>, rate: f64, symbol: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            rate,
            symbol: symbol.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrencyTable {
    #[serde(default)]
    rates: Vec<CurrencyRate>,
}

impl CurrencyTable {
    pub fn new(rates: Vec<CurrencyRate>) -> Self {
        Self { rates }
    }

    pub fn entry(&self, code: &str) -> Option<&CurrencyRate> {
        self.rates.iter().find(|entry| entry.code == code)
    }

    /// Unknown codes convert at parity.
    pub fn rate(&self, code: &str) -> f64 {
        self.entry(code).map(|entry| entry.rate).unwrap_or(1.0)
    }

    pub fn symbol(&self, code: &str) -> &str {
        self.entry(code)
            .map(|entry| entry.symbol.as_str())
            .unwrap_or(FALLBACK_SYMBOL)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.iter().map(|entry| entry.code.as_str())
    }

    pub fn entries(&self) -> &[CurrencyRate] {
        &self.rates
    }

    /// Inserts or replaces the entry for `rate.code`.
    pub fn upsert(&mut self, rate: CurrencyRate) {
        match self.rates.iter_mut().find(|entry| entry.code == rate.code) {
            Some(existing) => *existing = rate,
            None => self.rates.push(rate),
        }
    }
}

impl Default for CurrencyTable {
    fn default() -> Self {
        Self::new(vec![
            CurrencyRate::new("USD", 1.0, "$"),
            CurrencyRate::new("EUR", 0.92, "€"),
            CurrencyRate::new("GBP", 0.76, "£"),
            CurrencyRate::new("CAD", 1.34, "C$"),
            CurrencyRate::new("INR", 83.5, "₹"),
            CurrencyRate::new("AUD", 1.47, "A$"),
            CurrencyRate::new("JPY", 149.2, "¥"),
            CurrencyRate::new("CNY", 7.09, "¥"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_fall_back_to_parity_and_dollar() {
        let table = CurrencyTable::default();
        assert_eq!(table.rate("XYZ"), 1.0);
        assert_eq!(table.symbol("XYZ"), "$");
    }

    #[test]
    fn upsert_replaces_existing_rate() {
        let mut table = CurrencyTable::default();
        table.upsert(CurrencyRate::new("EUR", 0.9, "€"));
        assert_eq!(table.rate("EUR"), 0.9);
        assert_eq!(table.entries().len(), 8);
    }
}
