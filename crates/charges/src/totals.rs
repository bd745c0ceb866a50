use serde::{Deserialize, Serialize};

use towdesk_core::{Cents, TaxRate, ValueObject, money};

use crate::row::ChargeRow;

/// Derived sheet totals.
///
/// Never mutated independently: always the output of [`derive_totals`] over
/// the current rows, discount, and tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of non-discount extended amounts minus the flat discount.
    pub subtotal: Cents,
    pub tax_rate: TaxRate,
    pub tax: Cents,
    pub total: Cents,
}

impl ValueObject for Totals {}

impl Totals {
    pub fn zero(tax_rate: TaxRate) -> Self {
        Self {
            subtotal: 0,
            tax_rate,
            tax: 0,
            total: 0,
        }
    }
}

/// Pure totals derivation.
///
/// `subtotal = sum(extended over non-blank rows) - discount`;
/// `tax = subtotal * rate` rounded to the cent; `total = subtotal + tax`.
/// The discount is a flat subtrahend; it does not scale with any price.
pub fn derive_totals(rows: &[ChargeRow], discount: Cents, tax_rate: TaxRate) -> Totals {
    let charges = money::sum(rows.iter().filter(|r| !r.is_blank()).map(|r| r.extended()));
    let subtotal = money::sub(charges, discount);
    let tax = tax_rate.apply(subtotal);
    Totals {
        subtotal,
        tax_rate,
        tax,
        total: money::add(subtotal, tax),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{ItemId, PersistedItem};

    fn row(description: &str, quantity: i64, price: Cents) -> ChargeRow {
        ChargeRow::from_persisted(
            &PersistedItem {
                id: ItemId::new(description),
                description: description.to_string(),
                quantity,
                price,
                extended: None,
            },
            "towing",
        )
    }

    #[test]
    fn discount_is_a_flat_subtrahend() {
        let rows = vec![row("Hook up", 1, 6_000), row("Mileage", 10, 400)];
        let totals = derive_totals(&rows, 1_500, TaxRate::ZERO);
        assert_eq!(totals.subtotal, 8_500);
        assert_eq!(totals.tax, 0);
        assert_eq!(totals.total, 8_500);
    }

    #[test]
    fn tax_applies_after_the_discount() {
        let rows = vec![row("Storage", 4, 2_500)];
        let totals = derive_totals(&rows, 1_500, TaxRate::from_percent(8.25));
        assert_eq!(totals.subtotal, 8_500);
        assert_eq!(totals.tax, 701); // 8.25% of 85.00, rounded
        assert_eq!(totals.total, 9_201);
    }

    #[test]
    fn blank_rows_contribute_nothing() {
        let mut rows = vec![row("Hook up", 1, 6_000)];
        rows.push(ChargeRow::blank("towing"));
        let totals = derive_totals(&rows, 0, TaxRate::ZERO);
        assert_eq!(totals.subtotal, 6_000);
    }
}
