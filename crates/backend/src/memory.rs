//! In-memory backend double for tests and offline development.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;

use towdesk_charges::{InvoiceId, ItemId, PersistedItem, PriceLookup, PriceSuggestion, RowDraft};
use towdesk_kits::PriceBook;
use towdesk_vehicles::{Vin, VinDetails, VinDecoder};

use crate::api::{ChargeStore, PriceService, VinService};
use crate::client::ClientError;

/// Backend double holding everything in process memory.
///
/// Seed it up front (`set_price`, `set_vin_details`, `seed_items`), then
/// share it by reference. `set_offline(true)` makes every call fail the way
/// the real client does when the network is gone.
pub struct InMemoryBackend {
    items: Mutex<HashMap<InvoiceId, Vec<PersistedItem>>>,
    prices: PriceBook,
    vins: HashMap<String, VinDetails>,
    offline: AtomicBool,
    next_id: AtomicU64,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            prices: PriceBook::new(),
            vins: HashMap::new(),
            offline: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn seed_items(&self, invoice_id: InvoiceId, items: Vec<PersistedItem>) {
        if let Ok(mut map) = self.items.lock() {
            map.insert(invoice_id, items);
        }
    }

    pub fn set_price(
        &mut self,
        item_group: &str,
        description: &str,
        price: Option<i64>,
        quantity: Option<i64>,
    ) {
        self.prices.insert(item_group, description, price, quantity);
    }

    pub fn set_vin_details(&mut self, vin: &Vin, details: VinDetails) {
        self.vins.insert(vin.as_str().to_string(), details);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    fn ensure_online(&self) -> Result<(), ClientError> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(ClientError::Offline);
        }
        Ok(())
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChargeStore for InMemoryBackend {
    async fn fetch_items(&self, invoice_id: InvoiceId) -> Result<Vec<PersistedItem>, ClientError> {
        self.ensure_online()?;
        let map = self
            .items
            .lock()
            .map_err(|_| ClientError::Network("item store lock poisoned".to_string()))?;
        Ok(map.get(&invoice_id).cloned().unwrap_or_default())
    }

    async fn push_items(
        &self,
        invoice_id: InvoiceId,
        items: &[RowDraft],
    ) -> Result<(), ClientError> {
        self.ensure_online()?;
        let records = items
            .iter()
            .map(|draft| PersistedItem {
                id: draft.item_id.clone().unwrap_or_else(|| {
                    ItemId::new(format!("mem-{}", self.next_id.fetch_add(1, Ordering::Relaxed)))
                }),
                description: draft.description.clone(),
                quantity: draft.quantity,
                price: draft.unit_price,
                extended: Some(draft.extended),
            })
            .collect();
        let mut map = self
            .items
            .lock()
            .map_err(|_| ClientError::Network("item store lock poisoned".to_string()))?;
        map.insert(invoice_id, records);
        Ok(())
    }
}

#[async_trait]
impl PriceService for InMemoryBackend {
    async fn lookup_price(
        &self,
        description: &str,
        item_group: &str,
    ) -> Result<PriceSuggestion, ClientError> {
        self.ensure_online()?;
        Ok(self
            .prices
            .lookup(description, item_group)
            .unwrap_or_else(|e| match e {}))
    }
}

#[async_trait]
impl VinService for InMemoryBackend {
    async fn decode_vin(&self, vin: &Vin) -> Result<Option<VinDetails>, ClientError> {
        self.ensure_online()?;
        Ok(self.vins.get(vin.as_str()).cloned())
    }
}

// The double also satisfies the synchronous decoder contract used by
// in-process callers.
impl VinDecoder for InMemoryBackend {
    type Error = ClientError;

    fn decode(&self, vin: &Vin) -> Result<Option<VinDetails>, ClientError> {
        self.ensure_online()?;
        Ok(self.vins.get(vin.as_str()).cloned())
    }
}
