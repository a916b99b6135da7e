//! Per-user settings document stored under `users/{uid}`.

use std::fmt;

use serde::{de::Deserializer, Deserialize, Serialize};

/// Preferences that drive currency display and income-based budgeting.
///
/// Every field tolerates absence so that partially written documents still decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// Manually-set monthly income in base units, added on top of transaction income.
    #[serde(default)]
    pub monthly_income: f64,
    /// The raw figure the user typed, in their display currency and frequency.
    #[serde(default)]
    pub income_amount: f64,
    #[serde(default)]
    pub income_frequency: IncomeFrequency,
    #[serde(default = "UserSettings::default_currency")]
    pub currency: String,
    #[serde(default = "UserSettings::default_show_cents")]
    pub show_cents: bool,
    #[serde(default)]
    pub symbol_position: SymbolPosition,
    #[serde(default)]
    pub theme: Theme,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            monthly_income: 0.0,
            income_amount: 0.0,
            income_frequency: IncomeFrequency::default(),
            currency: Self::default_currency(),
            show_cents: Self::default_show_cents(),
            symbol_position: SymbolPosition::default(),
            theme: Theme::default(),
        }
    }
}

impl UserSettings {
    pub fn default_currency() -> String {
        "USD".into()
    }

    pub fn default_show_cents() -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IncomeFrequency {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl IncomeFrequency {
    /// Scales an amount paid at this frequency to a monthly figure.
    pub fn to_monthly(self, amount: f64) -> f64 {
        match self {
            IncomeFrequency::Weekly => amount * 4.0,
            IncomeFrequency::Monthly => amount,
            IncomeFrequency::Yearly => amount / 12.0,
        }
    }
}

/// Where the currency symbol is rendered relative to the number.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    #[default]
    Before,
    After,
}

impl SymbolPosition {
    /// Only `"before"` prefixes; every other stored value suffixes.
    pub fn from_str(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("before") {
            SymbolPosition::Before
        } else {
            SymbolPosition::After
        }
    }
}

impl fmt::Display for SymbolPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SymbolPosition::Before => "before",
            SymbolPosition::After => "after",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for SymbolPosition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .map(|v| SymbolPosition::from_str(&v))
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

impl Theme {
    pub fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Theme::Dark,
            "system" => Theme::System,
            _ => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.map(|v| Theme::from_str(&v)).unwrap_or_default())
    }
}
