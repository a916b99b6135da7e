//! Currency conversion and presentation.
//!
//! Stored amounts are always base units (USD). The read path converts with
//! [`convert`] and renders with [`format_amount`]; the write path turns a figure
//! typed in the display currency back into base units with [`normalize`].

use serde::Serialize;

use flowzi_domain::{CurrencyTable, SymbolPosition, UserSettings};

/// Display preferences lifted out of the settings document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyPreferences {
    pub currency: String,
    pub show_cents: bool,
    pub symbol_position: SymbolPosition,
}

impl Default for CurrencyPreferences {
    fn default() -> Self {
        Self::from(&UserSettings::default())
    }
}

impl From<&UserSettings> for CurrencyPreferences {
    fn from(settings: &UserSettings) -> Self {
        Self {
            currency: settings.currency.clone(),
            show_cents: settings.show_cents,
            symbol_position: settings.symbol_position,
        }
    }
}

/// Base units to display units. Unknown codes convert at parity.
pub fn convert(table: &CurrencyTable, base_amount: f64, code: &str) -> f64 {
    base_amount * table.rate(code)
}

/// Display units to base units.
pub fn normalize(table: &CurrencyTable, display_amount: f64, code: &str) -> f64 {
    display_amount / table.rate(code)
}

/// Renders an amount that is already in display units.
pub fn format_amount(
    table: &CurrencyTable,
    display_amount: f64,
    code: &str,
    show_cents: bool,
    position: SymbolPosition,
) -> String {
    let body = if show_cents {
        render_cents(display_amount)
    } else {
        render_whole(display_amount)
    };
    let symbol = table.symbol(code);
    match position {
        SymbolPosition::Before => format!("{}{}", symbol, body),
        SymbolPosition::After => format!("{}{}", body, symbol),
    }
}

// Products like 13.41847826 * 0.92 land a hair below the half-cent. Snapping to
// 1e-6 of a cent first makes the visible rounding follow the decimal value.
fn strip_noise(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

fn render_cents(value: f64) -> String {
    if !value.is_finite() {
        return render_non_finite(value);
    }
    let cents = strip_noise(value * 100.0).round();
    format!("{:.2}", cents / 100.0 + 0.0)
}

fn render_whole(value: f64) -> String {
    if !value.is_finite() {
        return render_non_finite(value);
    }
    let whole = (strip_noise(value * 100.0) / 100.0).floor();
    format!("{}", whole + 0.0)
}

fn render_non_finite(value: f64) -> String {
    if value.is_nan() {
        "NaN".into()
    } else if value > 0.0 {
        "Infinity".into()
    } else {
        "-Infinity".into()
    }
}

/// A currency table bound to one user's preferences.
#[derive(Debug, Clone)]
pub struct MoneyFormatter {
    table: CurrencyTable,
    prefs: CurrencyPreferences,
}

impl MoneyFormatter {
    pub fn new(table: CurrencyTable, prefs: CurrencyPreferences) -> Self {
        Self { table, prefs }
    }

    pub fn table(&self) -> &CurrencyTable {
        &self.table
    }

    pub fn preferences(&self) -> &CurrencyPreferences {
        &self.prefs
    }

    pub fn set_preferences(&mut self, prefs: CurrencyPreferences) {
        self.prefs = prefs;
    }

    pub fn symbol(&self) -> &str {
        self.table.symbol(&self.prefs.currency)
    }

    pub fn convert(&self, base_amount: f64) -> f64 {
        convert(&self.table, base_amount, &self.prefs.currency)
    }

    pub fn normalize(&self, display_amount: f64) -> f64 {
        normalize(&self.table, display_amount, &self.prefs.currency)
    }

    /// Converts then renders a base-unit amount.
    pub fn format(&self, base_amount: f64) -> String {
        format_amount(
            &self.table,
            self.convert(base_amount),
            &self.prefs.currency,
            self.prefs.show_cents,
            self.prefs.symbol_position,
        )
    }
}

impl Default for MoneyFormatter {
    fn default() -> Self {
        Self::new(CurrencyTable::default(), CurrencyPreferences::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eur(show_cents: bool, position: SymbolPosition) -> MoneyFormatter {
        MoneyFormatter::new(
            CurrencyTable::default(),
            CurrencyPreferences {
                currency: "EUR".into(),
                show_cents,
                symbol_position: position,
            },
        )
    }

    #[test]
    fn euro_amount_rounds_half_cent_up() {
        let base = 12.345 / 0.92;
        assert_eq!(eur(true, SymbolPosition::Before).format(base), "€12.35");
        assert_eq!(eur(false, SymbolPosition::Before).format(base), "€12");
    }

    #[test]
    fn symbol_can_trail_the_number() {
        assert_eq!(eur(true, SymbolPosition::After).format(100.0), "92.00€");
    }

    #[test]
    fn unknown_code_uses_dollar_at_parity() {
        let table = CurrencyTable::default();
        assert_eq!(convert(&table, 10.0, "ZZZ"), 10.0);
        assert_eq!(
            format_amount(&table, 10.0, "ZZZ", true, SymbolPosition::Before),
            "$10.00"
        );
    }

    #[test]
    fn whole_units_floor_negative_amounts() {
        let table = CurrencyTable::default();
        assert_eq!(
            format_amount(&table, -3.2, "USD", false, SymbolPosition::Before),
            "$-4"
        );
        assert_eq!(
            format_amount(&table, -0.0, "USD", true, SymbolPosition::Before),
            "$0.00"
        );
    }

    #[test]
    fn normalize_inverts_convert() {
        let table = CurrencyTable::default();
        let display = convert(&table, 250.0, "INR");
        assert!((normalize(&table, display, "INR") - 250.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_values_render_without_panicking() {
        let table = CurrencyTable::default();
        assert_eq!(
            format_amount(&table, f64::NAN, "USD", true, SymbolPosition::Before),
            "$NaN"
        );
        assert_eq!(
            format_amount(&table, f64::INFINITY, "USD", false, SymbolPosition::After),
            "Infinity$"
        );
    }
}
