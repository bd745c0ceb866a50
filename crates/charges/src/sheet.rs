use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use towdesk_core::{Cents, DomainError, DomainResult, Entity, EntityId, TaxRate};
use towdesk_events::Event;

use crate::lookup::{LookupTicket, PriceSuggestion, SuggestionOutcome};
use crate::row::{ChargeRow, DISCOUNT_DESCRIPTION, PersistedItem, RowDraft, RowId};
use crate::totals::{Totals, derive_totals};

/// Invoice identifier the charge sheet belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub EntityId);

impl InvoiceId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Notification for the invoice-change collaborator: the grand total moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsChanged {
    pub invoice_id: InvoiceId,
    pub totals: Totals,
    pub occurred_at: DateTime<Utc>,
}

impl Event for TotalsChanged {
    fn event_type(&self) -> &'static str {
        "charges.sheet.totals_changed"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// The editable charge sheet for one invoice.
///
/// Holds the ordered row list, the flat discount, the tax rate, and the
/// totals derived from all three. Mutations happen on discrete user-input
/// events, one row at a time; after every mutation the sheet re-derives its
/// totals and enforces the structural invariant that exactly one blank
/// next-entry row sits at the end of the list.
///
/// ## Lookup concurrency
///
/// The price lookup is the only asynchronous collaborator. Each row carries
/// an edit generation; [`ChargeSheet::set_description`] hands out a
/// [`LookupTicket`] pinned to the generation at request time, and
/// [`ChargeSheet::apply_suggestion`] drops any response whose ticket no
/// longer matches. Later writes therefore always win, per row, without any
/// locking or cancellation machinery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeSheet {
    id: InvoiceId,
    item_group: String,
    rows: Vec<ChargeRow>,
    discount: Cents,
    tax_rate: TaxRate,
    totals: Totals,
    totals_dirty: bool,
}

impl ChargeSheet {
    pub fn new(id: InvoiceId, item_group: impl Into<String>, tax_rate: TaxRate) -> Self {
        let item_group = item_group.into();
        Self {
            id,
            rows: vec![ChargeRow::blank(&item_group)],
            item_group,
            discount: 0,
            tax_rate,
            totals: Totals::zero(tax_rate),
            totals_dirty: false,
        }
    }

    pub fn invoice_id(&self) -> InvoiceId {
        self.id
    }

    pub fn item_group(&self) -> &str {
        &self.item_group
    }

    pub fn rows(&self) -> &[ChargeRow] {
        &self.rows
    }

    /// Rows that count as actual items (non-blank).
    pub fn actual_rows(&self) -> impl Iterator<Item = &ChargeRow> {
        self.rows.iter().filter(|r| !r.is_blank())
    }

    /// The always-present blank next-entry row.
    pub fn entry_row(&self) -> RowId {
        self.rows
            .last()
            .map(ChargeRow::row_id)
            .expect("sheet always holds a trailing blank entry row")
    }

    pub fn find_row(&self, row_id: RowId) -> Option<&ChargeRow> {
        self.rows.iter().find(|r| r.row_id() == row_id)
    }

    pub fn discount(&self) -> Cents {
        self.discount
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Rebuild the editable rows from the backend's persisted item list.
    ///
    /// - every persisted item maps to exactly one row, keeping the existing
    ///   row's local id when the persisted id already has one;
    /// - items with empty descriptions are skipped (never actual items);
    /// - an item carrying the discount marker is routed to the flat discount
    ///   amount instead of the row list;
    /// - exactly one trailing blank row exists afterwards, reusing the
    ///   current blank when possible.
    ///
    /// The external list replaces local state wholesale: unpersisted rows
    /// (other than the blank) do not survive. Re-running on the sheet's own
    /// output is a strict no-op, local row ids included.
    pub fn sync_persisted(&mut self, persisted: &[PersistedItem]) {
        let mut discount: Cents = 0;
        let mut next: Vec<ChargeRow> = Vec::with_capacity(persisted.len() + 1);

        for item in persisted {
            if item.description.trim().is_empty() {
                continue;
            }
            if item.description == DISCOUNT_DESCRIPTION {
                // Persisted discount rows carry extended = -discount.
                discount = item.extended.map_or(item.price, |e| -e);
                continue;
            }
            match self.rows.iter().find(|r| r.item_id() == Some(&item.id)) {
                Some(existing) => {
                    let mut row = existing.clone();
                    row.adopt_persisted(item);
                    next.push(row);
                }
                None => next.push(ChargeRow::from_persisted(item, &self.item_group)),
            }
        }

        // Keep the current blank's identity so pending entry focus survives
        // a refresh.
        let blank = self
            .rows
            .iter()
            .rev()
            .find(|r| r.is_blank())
            .cloned()
            .unwrap_or_else(|| ChargeRow::blank(&self.item_group));
        next.push(blank);

        self.rows = next;
        self.discount = discount.max(0);
        self.recompute();
    }

    /// Edit a row's description.
    ///
    /// Returns a [`LookupTicket`] for the host to resolve against the price
    /// lookup collaborator, unless the description was blanked.
    pub fn set_description(
        &mut self,
        row_id: RowId,
        description: &str,
    ) -> DomainResult<Option<LookupTicket>> {
        let item_group = self.item_group.clone();
        let ticket = {
            let row = self.row_mut(row_id)?;
            row.set_description(description);
            (!row.is_blank()).then(|| LookupTicket {
                row_id,
                generation: row.generation(),
                description: row.description().to_string(),
                item_group,
            })
        };
        self.ensure_trailing_blank();
        self.recompute();
        Ok(ticket)
    }

    pub fn set_quantity(&mut self, row_id: RowId, quantity: i64) -> DomainResult<()> {
        self.row_mut(row_id)?.set_quantity(quantity);
        self.recompute();
        Ok(())
    }

    pub fn set_unit_price(&mut self, row_id: RowId, unit_price: Cents) -> DomainResult<()> {
        self.row_mut(row_id)?.set_unit_price(unit_price);
        self.recompute();
        Ok(())
    }

    /// Blur hook for the quantity field: leaving it at 0 abandons the entry,
    /// resetting the whole row to the blank state. Returns whether the row
    /// was cleared.
    pub fn blur_quantity(&mut self, row_id: RowId) -> DomainResult<bool> {
        let cleared = {
            let row = self.row_mut(row_id)?;
            if row.quantity() == 0 && !row.is_blank() {
                row.clear();
                true
            } else {
                false
            }
        };
        if cleared {
            self.ensure_trailing_blank();
            self.recompute();
        }
        Ok(cleared)
    }

    /// Fill a row from an entry the operator picked off a list (kit item,
    /// price-book hit). Committing into the trailing blank appends a fresh
    /// blank for the next entry.
    pub fn commit_entry(
        &mut self,
        row_id: RowId,
        description: &str,
        quantity: i64,
        unit_price: Cents,
    ) -> DomainResult<()> {
        if description.trim().is_empty() {
            return Err(DomainError::validation(
                "cannot commit an entry without a description",
            ));
        }
        self.row_mut(row_id)?.fill(description, quantity, unit_price);
        self.ensure_trailing_blank();
        self.recompute();
        Ok(())
    }

    /// Apply a lookup response. Dropped (logged) when the target row no
    /// longer exists or has been edited since the ticket was issued.
    pub fn apply_suggestion(
        &mut self,
        ticket: &LookupTicket,
        suggestion: PriceSuggestion,
    ) -> SuggestionOutcome {
        if suggestion.is_empty() {
            return SuggestionOutcome::NoSuggestion;
        }
        let Some(row) = self.rows.iter_mut().find(|r| r.row_id() == ticket.row_id) else {
            debug!(row_id = %ticket.row_id, "lookup response targets a vanished row; dropped");
            return SuggestionOutcome::Stale;
        };
        if row.generation() != ticket.generation {
            debug!(row_id = %ticket.row_id, "stale lookup response; row edited since; dropped");
            return SuggestionOutcome::Stale;
        }
        row.set_quantity(suggestion.quantity.unwrap_or(1));
        if let Some(price) = suggestion.price {
            row.set_unit_price(price);
        }
        self.recompute();
        SuggestionOutcome::Applied
    }

    /// Set the flat discount amount (negative input clamps to zero).
    pub fn set_discount(&mut self, amount: Cents) {
        self.discount = amount.max(0);
        self.recompute();
    }

    pub fn set_tax_rate(&mut self, tax_rate: TaxRate) {
        self.tax_rate = tax_rate;
        self.recompute();
    }

    /// Full edited row list in wire shape for the host to persist. The
    /// discount, when set, exports as the fixed marker row sorted last.
    pub fn draft_items(&self) -> Vec<RowDraft> {
        let mut drafts: Vec<RowDraft> = self.actual_rows().map(RowDraft::from_row).collect();
        if self.discount != 0 {
            drafts.push(RowDraft::discount(self.discount));
        }
        drafts
    }

    /// Drain the pending totals notification, if the grand total moved since
    /// the last drain. Successive changes collapse into one notification
    /// carrying the latest totals.
    pub fn take_totals_changed(&mut self, occurred_at: DateTime<Utc>) -> Option<TotalsChanged> {
        if !self.totals_dirty {
            return None;
        }
        self.totals_dirty = false;
        Some(TotalsChanged {
            invoice_id: self.id,
            totals: self.totals,
            occurred_at,
        })
    }

    fn row_mut(&mut self, row_id: RowId) -> DomainResult<&mut ChargeRow> {
        self.rows
            .iter_mut()
            .find(|r| r.row_id() == row_id)
            .ok_or(DomainError::NotFound)
    }

    fn ensure_trailing_blank(&mut self) {
        while self.rows.len() >= 2
            && self.rows[self.rows.len() - 1].is_blank()
            && self.rows[self.rows.len() - 2].is_blank()
        {
            self.rows.pop();
        }
        if self.rows.last().is_none_or(|r| !r.is_blank()) {
            self.rows.push(ChargeRow::blank(&self.item_group));
        }
    }

    fn recompute(&mut self) {
        let next = derive_totals(&self.rows, self.discount, self.tax_rate);
        if next.total != self.totals.total {
            self.totals_dirty = true;
        }
        self.totals = next;
    }
}

impl Entity for ChargeSheet {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
