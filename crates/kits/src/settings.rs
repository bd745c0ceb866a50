use serde::{Deserialize, Serialize};

use towdesk_core::TaxRate;

/// Shop-wide defaults, persisted as configuration by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSettings {
    /// Tax rate applied to new charge sheets.
    pub default_tax_rate: TaxRate,
    /// Item groups charges and kits can be tagged with.
    pub item_groups: Vec<String>,
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            default_tax_rate: TaxRate::ZERO,
            item_groups: vec!["towing".to_string(), "storage".to_string()],
        }
    }
}

impl ShopSettings {
    pub fn default_group(&self) -> &str {
        self.item_groups
            .first()
            .map(String::as_str)
            .unwrap_or("towing")
    }
}
