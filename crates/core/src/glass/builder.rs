use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::catalog::CatalogItem;
use crate::domain::line::{Category, GlassDimensions, LineItem, LineSource};
use crate::errors::DomainError;
use crate::glass::sku::size_from_sku;
use crate::identity::normalize_variant;
use crate::sizing::area::{AreaResult, SQ_INCHES_PER_SQFT};

/// Which area a glass line is billed by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceMode {
    /// The customer's cut, rounded to standard steps.
    #[default]
    Actual,
    /// The catalog sheet's nominal size times the number of sheets.
    BySku,
}

impl fmt::Display for PriceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actual => f.write_str("actual"),
            Self::BySku => f.write_str("by_sku"),
        }
    }
}

impl FromStr for PriceMode {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "actual" => Ok(Self::Actual),
            "by_sku" | "bysku" | "sku" => Ok(Self::BySku),
            other => Err(DomainError::InvariantViolation(format!(
                "unsupported price mode `{other}` (expected actual|by_sku)"
            ))),
        }
    }
}

/// Confirmed glass selection, in the shape persistence and pricing expect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlassLine {
    pub sku: String,
    pub name: String,
    pub qty: u32,
    pub is_glass: bool,
    pub is_variant: bool,
    pub category: Category,
    pub variant_code: Option<String>,
    pub width_raw: f64,
    pub height_raw: f64,
    pub width_rounded: f64,
    pub height_rounded: f64,
    pub sqft_raw: f64,
    pub sqft_rounded: f64,
    pub actual_sqft: f64,
    pub sku_sqft: f64,
    /// Billable area: `actual_sqft` or `sku_sqft` depending on `price_mode`.
    pub sqft: f64,
    pub price_mode: PriceMode,
    pub qty_customer: u32,
    pub qty_sku: u32,
    pub product_group: Option<String>,
}

impl GlassLine {
    pub fn into_line_item(self) -> LineItem {
        LineItem {
            sku: self.sku,
            name: self.name,
            qty: self.qty,
            category: Some(Category::Glass),
            unit: None,
            sqft_sheet: self.sqft,
            variant_code: self.variant_code,
            source: LineSource::Ui,
            needs_pricing: true,
            is_glass: true,
            glass: Some(GlassDimensions {
                width_raw: self.width_raw,
                height_raw: self.height_raw,
                width_rounded: self.width_rounded,
                height_rounded: self.height_rounded,
                sqft_raw: self.sqft_raw,
                sqft_rounded: self.sqft_rounded,
                actual_sqft: self.actual_sqft,
                sku_sqft: self.sku_sqft,
                price_mode: self.price_mode,
                qty_customer: self.qty_customer,
                qty_sku: self.qty_sku,
                is_variant: self.is_variant,
            }),
            product_group: self.product_group,
            ..LineItem::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GlassLineBuilder;

impl GlassLineBuilder {
    /// Sheet size in inches as listed by the catalog, or as encoded in the sku
    /// when the catalog entry lists none.
    pub fn nominal_size(item: &CatalogItem) -> (f64, f64) {
        if item.width > 0.0 && item.height > 0.0 {
            (item.width, item.height)
        } else {
            size_from_sku(&item.sku).unwrap_or((0.0, 0.0))
        }
    }

    /// Nominal area of `qty_sku` catalog sheets.
    pub fn sku_sqft(item: &CatalogItem, qty_sku: u32) -> f64 {
        let (width, height) = Self::nominal_size(item);
        width * height / SQ_INCHES_PER_SQFT * f64::from(qty_sku)
    }

    pub fn build(
        &self,
        item: &CatalogItem,
        sizing: &AreaResult,
        qty_sku: u32,
        variant_code: Option<&str>,
        price_mode: PriceMode,
    ) -> Result<GlassLine, DomainError> {
        let sku = item.sku.trim();
        if sku.is_empty() {
            return Err(DomainError::MissingSku);
        }

        let variant_code = if item.is_variant { normalize_variant(variant_code) } else { None };
        if item.is_variant {
            let mut missing = Vec::new();
            if variant_code.is_none() {
                missing.push("variant_code".to_owned());
            }
            if sizing.width_raw <= 0.0 {
                missing.push("width".to_owned());
            }
            if sizing.height_raw <= 0.0 {
                missing.push("height".to_owned());
            }
            if !missing.is_empty() {
                return Err(DomainError::IncompleteGlassSelection { sku: sku.to_owned(), missing });
            }
        }

        let sku_sqft = Self::sku_sqft(item, qty_sku);
        let sqft = match price_mode {
            PriceMode::Actual => sizing.actual_sqft,
            PriceMode::BySku => sku_sqft,
        };

        let name = match variant_code.as_deref() {
            Some(code) => format!("{} {code}", item.description),
            None => item.description.clone(),
        };

        debug!(
            event_name = "glass.line_built",
            sku,
            variant_code = variant_code.as_deref().unwrap_or(""),
            price_mode = %price_mode,
            billable_sqft = sqft,
            "glass line assembled"
        );

        Ok(GlassLine {
            sku: sku.to_owned(),
            name,
            // the whole cut is billed as one line; pieces live in qty_customer
            qty: 1,
            is_glass: true,
            is_variant: item.is_variant,
            category: Category::Glass,
            variant_code,
            width_raw: sizing.width_raw,
            height_raw: sizing.height_raw,
            width_rounded: sizing.width_rounded,
            height_rounded: sizing.height_rounded,
            sqft_raw: sizing.sqft_raw,
            sqft_rounded: sizing.sqft_rounded,
            actual_sqft: sizing.actual_sqft,
            sku_sqft,
            sqft,
            price_mode,
            qty_customer: sizing.qty,
            qty_sku,
            product_group: item.product_group.clone(),
        })
    }
}
