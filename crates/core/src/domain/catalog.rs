use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A pickable catalog entry as returned by the product filter endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogItem {
    pub sku: String,
    pub description: String,
    /// Nominal width in inches; zero when the catalog does not list one.
    pub width: f64,
    pub height: f64,
    pub is_variant: bool,
    pub thickness: Option<f64>,
    pub cost: Option<Decimal>,
    pub unit: Option<String>,
    #[serde(rename = "product_group")]
    pub product_group: Option<String>,
    #[serde(rename = "product_sub_group")]
    pub product_sub_group: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn find(&self, sku: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.sku == sku)
    }

    pub fn variants(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter().filter(|item| item.is_variant)
    }
}
