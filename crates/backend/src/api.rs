//! Async collaborator contracts the host wires the domain to.

use async_trait::async_trait;

use towdesk_charges::{InvoiceId, PersistedItem, PriceSuggestion, RowDraft};
use towdesk_vehicles::{Vin, VinDetails};

use crate::client::ClientError;

/// Persistence collaborator: the hosted backend's charge-item records.
///
/// `fetch_items` supplies the list the sheet synchronizes from; `push_items`
/// receives the full edited row list after every change.
#[async_trait]
pub trait ChargeStore: Send + Sync {
    async fn fetch_items(&self, invoice_id: InvoiceId) -> Result<Vec<PersistedItem>, ClientError>;

    async fn push_items(
        &self,
        invoice_id: InvoiceId,
        items: &[RowDraft],
    ) -> Result<(), ClientError>;
}

/// Remote price lookup collaborator.
#[async_trait]
pub trait PriceService: Send + Sync {
    async fn lookup_price(
        &self,
        description: &str,
        item_group: &str,
    ) -> Result<PriceSuggestion, ClientError>;
}

/// Remote VIN decode collaborator.
#[async_trait]
pub trait VinService: Send + Sync {
    async fn decode_vin(&self, vin: &Vin) -> Result<Option<VinDetails>, ClientError>;
}
