use std::collections::HashMap;
use std::convert::Infallible;

use towdesk_charges::{PriceLookup, PriceSuggestion};
use towdesk_core::Cents;

use crate::kit::{Kit, normalize};

/// In-memory price read model backing the charge sheet's lookup collaborator.
///
/// Keyed by (item group, normalized description). Built from kits plus any
/// standalone entries; a miss is a valid answer (empty suggestion), never an
/// error.
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    entries: HashMap<(String, String), PriceSuggestion>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_kits<'a>(kits: impl IntoIterator<Item = &'a Kit>) -> Self {
        let mut book = Self::new();
        for kit in kits {
            for item in kit.items() {
                book.insert(
                    kit.item_group(),
                    &item.description,
                    Some(item.unit_price),
                    Some(item.quantity),
                );
            }
        }
        book
    }

    /// Insert or replace an entry. Later inserts win, so shop-specific
    /// overrides can be layered over kit defaults.
    pub fn insert(
        &mut self,
        item_group: &str,
        description: &str,
        price: Option<Cents>,
        quantity: Option<i64>,
    ) {
        self.entries.insert(
            (item_group.trim().to_lowercase(), normalize(description)),
            PriceSuggestion { price, quantity },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PriceLookup for PriceBook {
    type Error = Infallible;

    fn lookup(&self, description: &str, item_group: &str) -> Result<PriceSuggestion, Infallible> {
        let key = (item_group.trim().to_lowercase(), normalize(description));
        Ok(self
            .entries
            .get(&key)
            .copied()
            .unwrap_or_else(PriceSuggestion::none))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kit::{KitId, KitItem};
    use towdesk_core::EntityId;

    fn standard_tow_kit() -> Kit {
        let mut kit = Kit::create(KitId::new(EntityId::new()), "Standard tow", "towing").unwrap();
        kit.add_item(KitItem {
            description: "Hook up".to_string(),
            quantity: 1,
            unit_price: 6_000,
        })
        .unwrap();
        kit.add_item(KitItem {
            description: "Mileage".to_string(),
            quantity: 1,
            unit_price: 400,
        })
        .unwrap();
        kit
    }

    #[test]
    fn lookup_is_case_and_whitespace_insensitive() {
        let book = PriceBook::from_kits([&standard_tow_kit()]);
        let suggestion = book.lookup("  hook UP ", "Towing").unwrap();
        assert_eq!(suggestion.price, Some(6_000));
        assert_eq!(suggestion.quantity, Some(1));
    }

    #[test]
    fn lookup_is_scoped_by_item_group() {
        let book = PriceBook::from_kits([&standard_tow_kit()]);
        assert!(book.lookup("Hook up", "storage").unwrap().is_empty());
    }

    #[test]
    fn misses_answer_with_an_empty_suggestion() {
        let book = PriceBook::new();
        assert!(book.lookup("Gate fee", "towing").unwrap().is_empty());
    }

    #[test]
    fn later_inserts_override_kit_defaults() {
        let mut book = PriceBook::from_kits([&standard_tow_kit()]);
        book.insert("towing", "Hook up", Some(7_500), None);
        let suggestion = book.lookup("Hook up", "towing").unwrap();
        assert_eq!(suggestion.price, Some(7_500));
        assert_eq!(suggestion.quantity, None);
    }
}
