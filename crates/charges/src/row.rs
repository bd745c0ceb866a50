use serde::{Deserialize, Serialize};

use towdesk_core::{Cents, EntityId, money};

/// Fixed description marking the discount pseudo-row in persisted data.
pub const DISCOUNT_DESCRIPTION: &str = "Discount";

/// Stable local identifier of an editable row.
///
/// Distinct from the persisted [`ItemId`]: local ids survive
/// re-synchronization, so in-flight edits and pending lookups stay attached
/// to the same visible row across backend refreshes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub EntityId);

impl RowId {
    pub fn new() -> Self {
        Self(EntityId::new())
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RowId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Persisted charge item identifier, assigned by the hosted backend.
///
/// Opaque string: the backend's record keys are not UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wire record for a persisted charge item (hosted backend shape).
///
/// `extended` is optional on the wire; rows always recompute it locally so
/// the `extended = quantity * price` invariant cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedItem {
    pub id: ItemId,
    pub description: String,
    pub quantity: i64,
    pub price: Cents,
    #[serde(default)]
    pub extended: Option<Cents>,
}

/// Outbound wire record: one edited row as the host should persist it.
///
/// `item_id` is absent on rows the backend has not assigned an id to yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDraft {
    pub item_id: Option<ItemId>,
    pub description: String,
    pub quantity: i64,
    pub unit_price: Cents,
    pub extended: Cents,
}

impl RowDraft {
    pub(crate) fn from_row(row: &ChargeRow) -> Self {
        Self {
            item_id: row.item_id().cloned(),
            description: row.description().to_string(),
            quantity: row.quantity(),
            unit_price: row.unit_price(),
            extended: row.extended(),
        }
    }

    /// The discount exported as the fixed marker row, sorted last by the
    /// sheet. Carries `extended = -discount`.
    pub(crate) fn discount(amount: Cents) -> Self {
        Self {
            item_id: None,
            description: DISCOUNT_DESCRIPTION.to_string(),
            quantity: 1,
            unit_price: amount,
            extended: -amount,
        }
    }
}

/// One editable charge line.
///
/// Fields are only mutated through the owning [`crate::ChargeSheet`]; every
/// mutation that changes a value bumps the row's edit generation, which is
/// what invalidates lookup responses issued against older contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRow {
    row_id: RowId,
    item_id: Option<ItemId>,
    description: String,
    quantity: i64,
    unit_price: Cents,
    extended: Cents,
    item_group: String,
    generation: u64,
}

impl ChargeRow {
    /// Fresh empty row (the next-entry placeholder).
    pub(crate) fn blank(item_group: &str) -> Self {
        Self {
            row_id: RowId::new(),
            item_id: None,
            description: String::new(),
            quantity: 0,
            unit_price: 0,
            extended: 0,
            item_group: item_group.to_string(),
            generation: 0,
        }
    }

    pub(crate) fn from_persisted(item: &PersistedItem, item_group: &str) -> Self {
        Self {
            row_id: RowId::new(),
            item_id: Some(item.id.clone()),
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.price,
            extended: money::extend(item.quantity, item.price),
            item_group: item_group.to_string(),
            generation: 0,
        }
    }

    pub fn row_id(&self) -> RowId {
        self.row_id
    }

    pub fn item_id(&self) -> Option<&ItemId> {
        self.item_id.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Cents {
        self.unit_price
    }

    pub fn extended(&self) -> Cents {
        self.extended
    }

    pub fn item_group(&self) -> &str {
        &self.item_group
    }

    /// Edit generation; bumped on every value change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Empty-description rows are placeholders, never actual items.
    pub fn is_blank(&self) -> bool {
        self.description.trim().is_empty()
    }

    pub(crate) fn set_description(&mut self, description: &str) {
        if self.description != description {
            self.description = description.to_string();
            self.generation += 1;
        }
    }

    pub(crate) fn set_quantity(&mut self, quantity: i64) {
        if self.quantity != quantity {
            self.quantity = quantity;
            self.generation += 1;
            self.recompute_extended();
        }
    }

    pub(crate) fn set_unit_price(&mut self, unit_price: Cents) {
        if self.unit_price != unit_price {
            self.unit_price = unit_price;
            self.generation += 1;
            self.recompute_extended();
        }
    }

    /// Fill the row from a picked entry in one step.
    pub(crate) fn fill(&mut self, description: &str, quantity: i64, unit_price: Cents) {
        self.description = description.to_string();
        self.quantity = quantity;
        self.unit_price = unit_price;
        self.generation += 1;
        self.recompute_extended();
    }

    /// Abandon the entry: reset everything back to the blank state,
    /// including the persisted link.
    pub(crate) fn clear(&mut self) {
        self.item_id = None;
        self.description.clear();
        self.quantity = 0;
        self.unit_price = 0;
        self.extended = 0;
        self.generation += 1;
    }

    /// Overwrite local values from a persisted record during synchronization.
    ///
    /// Bumps the generation only when something actually changed, so
    /// re-synchronizing identical data is a strict no-op.
    pub(crate) fn adopt_persisted(&mut self, item: &PersistedItem) {
        let changed = self.item_id.as_ref() != Some(&item.id)
            || self.description != item.description
            || self.quantity != item.quantity
            || self.unit_price != item.price;
        if changed {
            self.item_id = Some(item.id.clone());
            self.description = item.description.clone();
            self.quantity = item.quantity;
            self.unit_price = item.price;
            self.generation += 1;
            self.recompute_extended();
        }
    }

    fn recompute_extended(&mut self) {
        self.extended = money::extend(self.quantity, self.unit_price);
    }
}
