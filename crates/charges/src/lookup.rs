//! Price-lookup collaborator contract and the stale-response guard around it.

use serde::{Deserialize, Serialize};
use tracing::warn;

use towdesk_core::{Cents, ValueObject};

use crate::row::RowId;
use crate::sheet::ChargeSheet;

/// Price/quantity suggestion returned by the lookup collaborator.
///
/// Either side may be absent; an entirely empty suggestion means "no match"
/// and leaves the row untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSuggestion {
    pub price: Option<Cents>,
    pub quantity: Option<i64>,
}

impl ValueObject for PriceSuggestion {}

impl PriceSuggestion {
    pub fn none() -> Self {
        Self {
            price: None,
            quantity: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.quantity.is_none()
    }
}

/// Correlates an in-flight lookup with the exact row edit that issued it.
///
/// The generation snapshot is the whole concurrency story (see the sheet
/// docs): a response only applies if the row has not been edited since.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub row_id: RowId,
    pub generation: u64,
    pub description: String,
    pub item_group: String,
}

/// What happened to a lookup response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionOutcome {
    /// The suggestion was applied to the row.
    Applied,
    /// The collaborator had nothing to offer (or failed); row untouched.
    NoSuggestion,
    /// The row was edited (or replaced) after the ticket was issued; the
    /// response was dropped so the newer values win.
    Stale,
}

/// Price-lookup collaborator: given a description and item group, suggest a
/// price/quantity pair. Best effort: failure is treated as "no suggestion".
pub trait PriceLookup {
    type Error: core::fmt::Debug;

    fn lookup(&self, description: &str, item_group: &str) -> Result<PriceSuggestion, Self::Error>;
}

/// Resolve a ticket against the collaborator and apply the result.
///
/// Single best-effort attempt, no retry; a failed lookup is logged and the
/// row keeps its prior values.
pub fn resolve_ticket<L: PriceLookup>(
    sheet: &mut ChargeSheet,
    lookup: &L,
    ticket: &LookupTicket,
) -> SuggestionOutcome {
    match lookup.lookup(&ticket.description, &ticket.item_group) {
        Ok(suggestion) => sheet.apply_suggestion(ticket, suggestion),
        Err(err) => {
            warn!(
                description = %ticket.description,
                error = ?err,
                "price lookup failed; leaving row unchanged"
            );
            SuggestionOutcome::NoSuggestion
        }
    }
}
