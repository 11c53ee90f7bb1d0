//! Fixed-precision pricing utilities: tick-grid validation and
//! `BASE_QUOTE` symbol parsing. Prices and quantities are `rust_decimal`
//! values throughout the engine — never native floats.

use rust_decimal::Decimal;

/// Per-symbol price/quantity rules, configured by the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickConfig {
    pub tick_size: Decimal,
    pub min_quantity: Decimal,
}

impl TickConfig {
    pub fn new(tick_size: Decimal, min_quantity: Decimal) -> Self {
        Self {
            tick_size,
            min_quantity,
        }
    }

    /// A price is admissible iff it is an exact multiple of `tick_size`.
    /// Comparison is exact on the decimal's scaled integer representation,
    /// never on a float cast.
    pub fn is_on_tick(&self, price: Decimal) -> bool {
        if self.tick_size.is_zero() {
            return true;
        }
        (price % self.tick_size).is_zero()
    }

    pub fn meets_minimum(&self, quantity: Decimal) -> bool {
        quantity >= self.min_quantity
    }
}

/// Splits a `BASE_QUOTE` symbol into its two legs. Returns `None` for a
/// malformed symbol (anything other than exactly one `_` separator).
pub fn parse_symbol(symbol: &str) -> Option<(&str, &str)> {
    let mut parts = symbol.splitn(2, '_');
    let base = parts.next()?;
    let quote = parts.next()?;
    if base.is_empty() || quote.is_empty() || quote.contains('_') {
        return None;
    }
    Some((base, quote))
}

pub fn symbol_of(base: &str, quote: &str) -> String {
    format!("{base}_{quote}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn tick_alignment() {
        let tick = TickConfig::new(dec!(0.01), dec!(0.0001));
        assert!(tick.is_on_tick(dec!(1.00)));
        assert!(tick.is_on_tick(dec!(1.23)));
        assert!(!tick.is_on_tick(dec!(1.235)));
    }

    #[test]
    fn zero_tick_accepts_anything() {
        let tick = TickConfig::new(dec!(0), dec!(0));
        assert!(tick.is_on_tick(dec!(1.23456)));
    }

    #[test]
    fn minimum_quantity() {
        let tick = TickConfig::new(dec!(0.01), dec!(1));
        assert!(tick.meets_minimum(dec!(1)));
        assert!(!tick.meets_minimum(dec!(0.5)));
    }

    #[test]
    fn symbol_roundtrip() {
        assert_eq!(parse_symbol("HBAR_USDT"), Some(("HBAR", "USDT")));
        assert_eq!(parse_symbol("HBAR"), None);
        assert_eq!(parse_symbol("HBAR_USD_T"), None);
        assert_eq!(symbol_of("HBAR", "USDT"), "HBAR_USDT");
    }
}
