//! Remote collaborator clients for the hosted backend.
//!
//! The domain crates stay IO-free; this crate supplies what they talk to:
//! the persisted charge list, the price lookup, and the VIN decoder, all as
//! async traits with a reqwest-backed implementation and an in-memory double
//! for tests. All remote calls are single best-effort attempts; failures
//! degrade per the domain's rules instead of retrying.

pub mod api;
pub mod client;
pub mod host;
pub mod memory;

pub use api::{ChargeStore, PriceService, VinService};
pub use client::{ClientError, RemoteBackend};
pub use host::{decode_and_record, lookup_and_apply, persist_sheet, refresh_sheet};
pub use memory::InMemoryBackend;
