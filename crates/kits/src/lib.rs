//! Kit and settings domain module.
//!
//! Kits are named bundles of preset charge lines the operator drops onto a
//! charge sheet in one gesture. The [`PriceBook`] read model built from them
//! backs the charge sheet's price-lookup collaborator; [`ShopSettings`]
//! carries the shop-wide defaults (tax rate, item groups).

pub mod kit;
pub mod price_book;
pub mod settings;

pub use kit::{Kit, KitId, KitItem};
pub use price_book::PriceBook;
pub use settings::ShopSettings;
