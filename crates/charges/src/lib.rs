//! Charge-sheet domain module.
//!
//! This crate contains the invoice line-item ledger of the back office: an
//! ordered list of editable charge rows, a separate flat discount, and totals
//! (subtotal, tax, grand total) derived from them. It also owns the
//! synchronizer that rebuilds the editable rows from the hosted backend's
//! persisted item list, and the stale-response guard around the best-effort
//! price lookup collaborator.
//!
//! Everything here is deterministic domain logic (no IO, no HTTP, no
//! storage); the `towdesk-backend` crate supplies the remote collaborators.

pub mod lookup;
pub mod row;
pub mod sheet;
pub mod totals;

pub use lookup::{LookupTicket, PriceLookup, PriceSuggestion, SuggestionOutcome, resolve_ticket};
pub use row::{ChargeRow, DISCOUNT_DESCRIPTION, ItemId, PersistedItem, RowDraft, RowId};
pub use sheet::{ChargeSheet, InvoiceId, TotalsChanged};
pub use totals::{Totals, derive_totals};
