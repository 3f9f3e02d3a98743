use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::line::{LineItem, PriceSource};
use crate::numeric::{decimal_from_f64, finite_or_zero};
use crate::pricing::rounding::round_price;

/// A price typed over the system price on the summary screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ManualPrice {
    /// Glass: price per square foot, billed per sheet.
    PerSqft { price: Decimal },
    /// Aluminium profiles: price per kilogram times the profile weight.
    PerKg { price_per_kg: Decimal, weight: f64 },
    PerUnit { price: Decimal },
}

impl ManualPrice {
    /// The price the customer sees for one unit of the line once this override applies.
    pub fn display_price(&self, line: &LineItem) -> Decimal {
        match self {
            Self::PerSqft { price } if line.sells_by_sheet() => {
                round_price(*price * decimal_from_f64(line.sqft()))
            }
            Self::PerSqft { price } | Self::PerUnit { price } => *price,
            Self::PerKg { price_per_kg, weight } => {
                round_price(*price_per_kg * decimal_from_f64(finite_or_zero(*weight)))
            }
        }
    }

    pub fn apply(&self, line: &mut LineItem) {
        if line.price_source == PriceSource::System && line.system_price.is_none() {
            line.system_price = line.unit_price;
        }

        let display = self.display_price(line);
        match self {
            Self::PerSqft { price } if line.sells_by_sheet() => {
                line.unit_price = Some(*price);
                line.price_per_sheet = Some(display);
            }
            Self::PerKg { weight, .. } => {
                line.product_weight = finite_or_zero(*weight);
                line.unit_price = Some(display);
                line.price_per_sheet = None;
            }
            Self::PerSqft { .. } | Self::PerUnit { .. } => {
                line.unit_price = Some(display);
                line.price_per_sheet = None;
            }
        }

        line.line_total = Some(display * Decimal::from(line.qty));
        line.price_source = PriceSource::Manual;
        line.needs_pricing = false;
    }
}

/// Reference (W1) price of a line in display terms: per sheet for glass.
pub fn system_display_price(line: &LineItem) -> Decimal {
    let reference = line.system_price.or(line.unit_price).unwrap_or(Decimal::ZERO);
    if line.sells_by_sheet() {
        return reference * decimal_from_f64(line.sqft());
    }
    reference
}

/// True when the override would sell the line under its system price; callers
/// ask the user to confirm before applying it.
pub fn is_below_system_price(line: &LineItem, price: &ManualPrice) -> bool {
    price.display_price(line) < system_display_price(line)
}
