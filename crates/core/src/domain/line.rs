use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::glass::builder::PriceMode;
use crate::numeric::{decimal_from_f64, finite_or_zero};

/// Product taxonomy, keyed by the single-letter code that prefixes each sku.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Aluminium,
    Accessories,
    Glass,
    CLine,
    Gypsum,
    Sealant,
    Other(String),
}

impl Category {
    pub fn code(&self) -> &str {
        match self {
            Self::Aluminium => "A",
            Self::Accessories => "E",
            Self::Glass => "G",
            Self::CLine => "C",
            Self::Gypsum => "Y",
            Self::Sealant => "S",
            Self::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "A" => Self::Aluminium,
            "E" => Self::Accessories,
            "G" => Self::Glass,
            "C" => Self::CLine,
            "Y" => Self::Gypsum,
            "S" => Self::Sealant,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Category implied by the first letter of a sku.
    pub fn from_sku(sku: &str) -> Self {
        Self::from_code(sku.get(..1).unwrap_or_default())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<String> for Category {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.code().to_owned()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSource {
    /// Added during the current session.
    #[default]
    Ui,
    /// Restored from a persisted draft.
    Db,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    #[default]
    System,
    Manual,
}

/// Sizing audit trail carried by confirmed glass lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlassDimensions {
    pub width_raw: f64,
    pub height_raw: f64,
    pub width_rounded: f64,
    pub height_rounded: f64,
    pub sqft_raw: f64,
    pub sqft_rounded: f64,
    pub actual_sqft: f64,
    pub sku_sqft: f64,
    pub price_mode: PriceMode,
    pub qty_customer: u32,
    pub qty_sku: u32,
    pub is_variant: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "LineItemWire")]
pub struct LineItem {
    pub sku: String,
    pub name: String,
    pub qty: u32,
    pub category: Option<Category>,
    pub unit: Option<String>,
    pub cost: Option<Decimal>,
    pub pkg_size: u32,
    pub product_weight: f64,
    /// Area per unit in square feet; zero for anything that is not sold by area.
    pub sqft_sheet: f64,
    pub variant_code: Option<String>,
    /// Price of record: per square foot for glass, per unit for everything else.
    pub unit_price: Option<Decimal>,
    pub price_per_sheet: Option<Decimal>,
    /// System (W1) reference price kept alongside manual overrides.
    pub system_price: Option<Decimal>,
    pub line_total: Option<Decimal>,
    pub source: LineSource,
    pub needs_pricing: bool,
    pub is_draft_item: bool,
    pub price_source: PriceSource,
    pub is_glass: bool,
    pub glass: Option<GlassDimensions>,
    pub product_group: Option<String>,
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            sku: String::new(),
            name: String::new(),
            qty: 1,
            category: None,
            unit: None,
            cost: None,
            pkg_size: 1,
            product_weight: 0.0,
            sqft_sheet: 0.0,
            variant_code: None,
            unit_price: None,
            price_per_sheet: None,
            system_price: None,
            line_total: None,
            source: LineSource::Ui,
            needs_pricing: true,
            is_draft_item: false,
            price_source: PriceSource::System,
            is_glass: false,
            glass: None,
            product_group: None,
        }
    }
}

/// Inbound line shape. Persisted drafts and older clients spell some fields
/// differently (`sqft`, `UnitPrice`, `price`, `variantCode`, `lineTotal`); the
/// snake_case name wins when both are present.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LineItemWire {
    sku: String,
    name: String,
    qty: Option<u32>,
    category: Option<Category>,
    unit: Option<String>,
    cost: Option<Decimal>,
    pkg_size: Option<u32>,
    product_weight: Option<f64>,
    sqft_sheet: Option<f64>,
    #[serde(rename = "sqftSheet")]
    sqft_sheet_camel: Option<f64>,
    sqft: Option<f64>,
    variant_code: Option<String>,
    #[serde(rename = "variantCode")]
    variant_code_camel: Option<String>,
    #[serde(rename = "VariantCode")]
    variant_code_pascal: Option<String>,
    unit_price: Option<Decimal>,
    price: Option<Decimal>,
    #[serde(rename = "UnitPrice")]
    unit_price_pascal: Option<Decimal>,
    price_per_sheet: Option<Decimal>,
    system_price: Option<Decimal>,
    line_total: Option<Decimal>,
    #[serde(rename = "lineTotal")]
    line_total_camel: Option<Decimal>,
    source: Option<LineSource>,
    needs_pricing: Option<bool>,
    is_draft_item: Option<bool>,
    price_source: Option<PriceSource>,
    is_glass: Option<bool>,
    glass: Option<GlassDimensions>,
    product_group: Option<String>,
}

impl From<LineItemWire> for LineItem {
    fn from(wire: LineItemWire) -> Self {
        let defaults = LineItem::default();
        Self {
            sku: wire.sku,
            name: wire.name,
            qty: wire.qty.unwrap_or(defaults.qty),
            category: wire.category,
            unit: wire.unit,
            cost: wire.cost,
            pkg_size: wire.pkg_size.unwrap_or(defaults.pkg_size),
            product_weight: wire.product_weight.unwrap_or(defaults.product_weight),
            sqft_sheet: wire
                .sqft_sheet
                .or(wire.sqft_sheet_camel)
                .or(wire.sqft)
                .unwrap_or(defaults.sqft_sheet),
            variant_code: wire
                .variant_code
                .or(wire.variant_code_camel)
                .or(wire.variant_code_pascal),
            unit_price: wire.unit_price.or(wire.price).or(wire.unit_price_pascal),
            price_per_sheet: wire.price_per_sheet,
            system_price: wire.system_price,
            line_total: wire.line_total.or(wire.line_total_camel),
            source: wire.source.unwrap_or(defaults.source),
            needs_pricing: wire.needs_pricing.unwrap_or(defaults.needs_pricing),
            is_draft_item: wire.is_draft_item.unwrap_or(defaults.is_draft_item),
            price_source: wire.price_source.unwrap_or(defaults.price_source),
            is_glass: wire.is_glass.unwrap_or(defaults.is_glass),
            glass: wire.glass,
            product_group: wire.product_group,
        }
    }
}

impl LineItem {
    pub fn new(sku: impl Into<String>, name: impl Into<String>, qty: u32) -> Self {
        Self { sku: sku.into(), name: name.into(), qty, ..Self::default() }
    }

    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    pub fn with_sqft(mut self, sqft_sheet: f64) -> Self {
        self.sqft_sheet = sqft_sheet;
        self
    }

    pub fn with_variant(mut self, variant_code: impl Into<String>) -> Self {
        self.variant_code = Some(variant_code.into());
        self
    }

    pub fn resolved_category(&self) -> Category {
        self.category.clone().unwrap_or_else(|| Category::from_sku(&self.sku))
    }

    pub fn is_glass_category(&self) -> bool {
        self.resolved_category() == Category::Glass
    }

    pub fn sqft(&self) -> f64 {
        finite_or_zero(self.sqft_sheet)
    }

    /// Glass lines with an area are shown per sheet; everything else per unit.
    pub fn sells_by_sheet(&self) -> bool {
        self.is_glass_category() && self.sqft() > 0.0
    }

    pub fn display_unit_price(&self) -> Decimal {
        let unit_price = self.unit_price.unwrap_or(Decimal::ZERO);
        if self.sells_by_sheet() {
            return self
                .price_per_sheet
                .unwrap_or_else(|| unit_price * decimal_from_f64(self.sqft()));
        }
        unit_price
    }

    pub fn effective_line_total(&self) -> Decimal {
        self.line_total.unwrap_or_else(|| self.display_unit_price() * Decimal::from(self.qty))
    }

    /// Recomputes the cached display price and line total from `unit_price`.
    pub fn reprice_from_unit(&mut self) {
        let unit_price = self.unit_price.unwrap_or(Decimal::ZERO);
        if self.sells_by_sheet() {
            let per_sheet = unit_price * decimal_from_f64(self.sqft());
            self.price_per_sheet = Some(per_sheet);
            self.line_total = Some(per_sheet * Decimal::from(self.qty));
        } else {
            self.price_per_sheet = None;
            self.line_total = Some(unit_price * Decimal::from(self.qty));
        }
    }
}
