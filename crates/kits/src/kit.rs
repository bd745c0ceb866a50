use serde::{Deserialize, Serialize};

use towdesk_core::{Cents, DomainError, DomainResult, Entity, EntityId};

/// Kit identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KitId(pub EntityId);

impl KitId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for KitId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One preset charge line inside a kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitItem {
    pub description: String,
    pub quantity: i64,
    pub unit_price: Cents,
}

/// Named bundle of preset charge lines, tagged with the item group its
/// prices apply to.
///
/// Descriptions are unique within a kit under trim/case normalization;
/// they are the lookup key the price book derives from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kit {
    id: KitId,
    name: String,
    item_group: String,
    items: Vec<KitItem>,
}

/// Lookup-key normalization shared with the price book.
pub(crate) fn normalize(description: &str) -> String {
    description.trim().to_lowercase()
}

impl Kit {
    pub fn create(
        id: KitId,
        name: impl Into<String>,
        item_group: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let item_group = item_group.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("kit name must not be empty"));
        }
        if item_group.trim().is_empty() {
            return Err(DomainError::validation("kit item group must not be empty"));
        }
        Ok(Self {
            id,
            name,
            item_group,
            items: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn item_group(&self) -> &str {
        &self.item_group
    }

    pub fn items(&self) -> &[KitItem] {
        &self.items
    }

    pub fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("kit name must not be empty"));
        }
        self.name = name;
        Ok(())
    }

    pub fn add_item(&mut self, item: KitItem) -> DomainResult<()> {
        if item.description.trim().is_empty() {
            return Err(DomainError::validation(
                "kit item description must not be empty",
            ));
        }
        if item.quantity <= 0 {
            return Err(DomainError::validation(
                "kit item quantity must be positive",
            ));
        }
        if item.unit_price < 0 {
            return Err(DomainError::validation(
                "kit item price must not be negative",
            ));
        }
        let key = normalize(&item.description);
        if self.items.iter().any(|i| normalize(&i.description) == key) {
            return Err(DomainError::conflict(format!(
                "kit already contains \"{}\"",
                item.description.trim()
            )));
        }
        self.items.push(item);
        Ok(())
    }

    pub fn remove_item(&mut self, description: &str) -> DomainResult<()> {
        let key = normalize(description);
        let before = self.items.len();
        self.items.retain(|i| normalize(&i.description) != key);
        if self.items.len() == before {
            return Err(DomainError::not_found());
        }
        Ok(())
    }
}

impl Entity for Kit {
    type Id = KitId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_kit() -> Kit {
        Kit::create(KitId::new(EntityId::new()), "Standard tow", "towing").unwrap()
    }

    fn item(description: &str, quantity: i64, unit_price: Cents) -> KitItem {
        KitItem {
            description: description.to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn create_rejects_blank_names_and_groups() {
        assert!(Kit::create(KitId::new(EntityId::new()), " ", "towing").is_err());
        assert!(Kit::create(KitId::new(EntityId::new()), "Standard tow", "").is_err());
    }

    #[test]
    fn add_item_validates_fields() {
        let mut kit = test_kit();
        assert!(kit.add_item(item("", 1, 100)).is_err());
        assert!(kit.add_item(item("Hook up", 0, 100)).is_err());
        assert!(kit.add_item(item("Hook up", 1, -5)).is_err());
        kit.add_item(item("Hook up", 1, 6_000)).unwrap();
        assert_eq!(kit.items().len(), 1);
    }

    #[test]
    fn duplicate_descriptions_conflict_under_normalization() {
        let mut kit = test_kit();
        kit.add_item(item("Hook up", 1, 6_000)).unwrap();
        let err = kit.add_item(item("  hook UP ", 2, 5_000)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn remove_item_matches_normalized_descriptions() {
        let mut kit = test_kit();
        kit.add_item(item("Hook up", 1, 6_000)).unwrap();
        kit.remove_item(" HOOK UP ").unwrap();
        assert!(kit.items().is_empty());
        assert_eq!(kit.remove_item("Hook up").unwrap_err(), DomainError::NotFound);
    }
}
