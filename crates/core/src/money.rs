//! Money arithmetic in integer cents, plus lenient parsing of user-typed
//! numeric input.
//!
//! All monetary amounts are carried in the smallest currency unit (cents) as
//! `i64`; discounts make negative amounts legitimate. Derivations saturate
//! on overflow instead of failing, so an edit is never rejected for
//! arithmetic reasons.

use serde::{Deserialize, Serialize};

/// Monetary amount in smallest currency unit (cents).
pub type Cents = i64;

/// Tax rate in basis points (1/100th of a percent).
///
/// Stored as an integer so totals derivation stays exact; 825 = 8.25%.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(u32);

impl TaxRate {
    pub const ZERO: TaxRate = TaxRate(0);

    pub fn from_basis_points(bps: u32) -> Self {
        Self(bps)
    }

    /// Convert a percentage as typed in a rate field (e.g. `8.25`).
    /// Negative or non-finite input coerces to zero.
    pub fn from_percent(percent: f64) -> Self {
        if !percent.is_finite() || percent <= 0.0 {
            return Self::ZERO;
        }
        Self((percent * 100.0).round() as u32)
    }

    pub fn as_basis_points(&self) -> u32 {
        self.0
    }

    pub fn as_percent(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Tax owed on `amount`, rounded half away from zero to the nearest cent.
    pub fn apply(&self, amount: Cents) -> Cents {
        let num = i128::from(amount) * i128::from(self.0);
        let bias = if num >= 0 { 5_000 } else { -5_000 };
        clamp_cents((num + bias) / 10_000)
    }
}

/// Extended amount for a charge line: quantity × unit price.
pub fn extend(quantity: i64, unit_price: Cents) -> Cents {
    clamp_cents(i128::from(quantity) * i128::from(unit_price))
}

/// Sum a sequence of amounts, saturating.
pub fn sum(amounts: impl IntoIterator<Item = Cents>) -> Cents {
    clamp_cents(amounts.into_iter().map(i128::from).sum())
}

/// Saturating subtraction of two amounts.
pub fn sub(lhs: Cents, rhs: Cents) -> Cents {
    clamp_cents(i128::from(lhs) - i128::from(rhs))
}

/// Saturating addition of two amounts.
pub fn add(lhs: Cents, rhs: Cents) -> Cents {
    clamp_cents(i128::from(lhs) + i128::from(rhs))
}

fn clamp_cents(value: i128) -> Cents {
    if value > i128::from(Cents::MAX) {
        Cents::MAX
    } else if value < i128::from(Cents::MIN) {
        Cents::MIN
    } else {
        value as Cents
    }
}

/// Parse a user-typed money amount ("10", "$1,234.5", "-3.25") into cents.
///
/// Malformed input coerces to 0; bad keystrokes degrade to an empty amount
/// rather than an error. Fraction digits past the second are ignored.
pub fn parse_cents(input: &str) -> Cents {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return 0;
    }

    let (negative, body) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let (dollars_str, frac_str) = match body.split_once('.') {
        Some((d, f)) => (d, f),
        None => (body, ""),
    };

    if !dollars_str.chars().all(|c| c.is_ascii_digit())
        || !frac_str.chars().all(|c| c.is_ascii_digit())
        || (dollars_str.is_empty() && frac_str.is_empty())
    {
        return 0;
    }

    let dollars: i128 = dollars_str.parse().unwrap_or(0);
    let mut frac: i128 = 0;
    for (i, c) in frac_str.chars().take(2).enumerate() {
        let digit = i128::from(c.to_digit(10).unwrap_or(0));
        frac += digit * if i == 0 { 10 } else { 1 };
    }

    let magnitude = dollars * 100 + frac;
    clamp_cents(if negative { -magnitude } else { magnitude })
}

/// Parse a user-typed whole quantity. Malformed input coerces to 0.
pub fn parse_quantity(input: &str) -> i64 {
    input.trim().parse().unwrap_or(0)
}

/// Render cents as a decimal string ("30.00", "-15.50").
pub fn format_cents(amount: Cents) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let magnitude = amount.unsigned_abs();
    format!("{}{}.{:02}", sign, magnitude / 100, magnitude % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_multiplies_quantity_by_price() {
        assert_eq!(extend(3, 1_000), 3_000);
        assert_eq!(extend(0, 1_000), 0);
        assert_eq!(extend(2, -750), -1_500);
    }

    #[test]
    fn extend_saturates_instead_of_wrapping() {
        assert_eq!(extend(i64::MAX, 2), Cents::MAX);
        assert_eq!(extend(i64::MIN, 2), Cents::MIN);
    }

    #[test]
    fn parse_cents_accepts_common_shapes() {
        assert_eq!(parse_cents("10.00"), 1_000);
        assert_eq!(parse_cents("10"), 1_000);
        assert_eq!(parse_cents("$1,234.5"), 123_450);
        assert_eq!(parse_cents("-3.25"), -325);
        assert_eq!(parse_cents(".75"), 75);
        assert_eq!(parse_cents("12.345"), 1_234);
    }

    #[test]
    fn malformed_money_coerces_to_zero() {
        assert_eq!(parse_cents(""), 0);
        assert_eq!(parse_cents("abc"), 0);
        assert_eq!(parse_cents("1.2.3"), 0);
        assert_eq!(parse_cents("-"), 0);
    }

    #[test]
    fn malformed_quantity_coerces_to_zero() {
        assert_eq!(parse_quantity("3"), 3);
        assert_eq!(parse_quantity(" 7 "), 7);
        assert_eq!(parse_quantity("x"), 0);
        assert_eq!(parse_quantity("1.5"), 0);
    }

    #[test]
    fn tax_rate_rounds_half_away_from_zero() {
        let rate = TaxRate::from_percent(8.25);
        assert_eq!(rate.as_basis_points(), 825);
        // 85.00 * 8.25% = 7.0125 -> 7.01
        assert_eq!(rate.apply(8_500), 701);
        // 100.00 * 8.25% = 8.25
        assert_eq!(rate.apply(10_000), 825);
        // Negative subtotals (discount larger than charges) tax negatively.
        assert_eq!(rate.apply(-10_000), -825);
        // 0.30 * 5% = 0.015 -> rounds up to 0.02
        assert_eq!(TaxRate::from_percent(5.0).apply(30), 2);
    }

    #[test]
    fn tax_rate_coerces_bad_percentages() {
        assert_eq!(TaxRate::from_percent(-4.0), TaxRate::ZERO);
        assert_eq!(TaxRate::from_percent(f64::NAN), TaxRate::ZERO);
    }

    #[test]
    fn format_cents_renders_two_decimals() {
        assert_eq!(format_cents(3_000), "30.00");
        assert_eq!(format_cents(-1_550), "-15.50");
        assert_eq!(format_cents(5), "0.05");
    }
}
