use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerRef;
use crate::domain::line::{Category, LineItem};
use crate::domain::quote::{DeliveryType, QuoteDraft};
use crate::identity::PricingKey;

/// Customer fields the pricing service scores against.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerData {
    #[serde(rename = "customerCode")]
    pub customer_code: String,
    #[serde(rename = "customerName")]
    pub customer_name: String,
    #[serde(rename = "paymentTerm")]
    pub payment_term: String,
    #[serde(rename = "paymentMethod")]
    pub payment_method: String,
    pub customer_date: String,
    pub accum_6m: Decimal,
    pub frequency: Decimal,
    pub gen_bus: String,
    #[serde(rename = "shippingCustomerPay")]
    pub shipping_customer_pay: Decimal,
}

impl CustomerData {
    pub fn from_draft(draft: &QuoteDraft) -> Self {
        let shipping_customer_pay = draft.shipping.customer_pay;
        match draft.customer.as_ref() {
            Some(customer) => Self {
                customer_code: customer.customer_code().to_owned(),
                customer_name: customer.name.clone(),
                payment_term: customer.payment_terms.clone(),
                payment_method: customer.payment_method.clone(),
                customer_date: customer.customer_date.clone(),
                accum_6m: customer.accum_6m,
                frequency: customer.frequency,
                gen_bus: customer.gen_bus.clone(),
                shipping_customer_pay,
            },
            None => Self { shipping_customer_pay, ..Self::default() },
        }
    }
}

/// One cart line as sent for pricing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingLine {
    pub sku: String,
    pub name: String,
    pub qty: u32,
    pub sqft_sheet: f64,
    pub cost: Option<Decimal>,
    pub pkg_size: u32,
    pub category: Category,
    pub unit: String,
    pub product_weight: f64,
    #[serde(rename = "relevantSales")]
    pub relevant_sales: Decimal,
}

impl PricingLine {
    pub fn from_line(line: &LineItem, customer: Option<&CustomerRef>) -> Self {
        let category = line.resolved_category();
        let relevant_sales =
            customer.map(|customer| customer.sales.for_category(&category)).unwrap_or_default();

        Self {
            sku: line.sku.clone(),
            name: line.name.clone(),
            qty: line.qty,
            sqft_sheet: line.sqft(),
            cost: line.cost,
            pkg_size: line.pkg_size.max(1),
            category,
            unit: line.unit.clone().unwrap_or_default(),
            product_weight: line.product_weight,
            relevant_sales,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    #[serde(rename = "customerData")]
    pub customer_data: CustomerData,
    #[serde(rename = "deliveryType")]
    pub delivery_type: DeliveryType,
    pub cart: Vec<PricingLine>,
}

impl PricingRequest {
    pub fn for_lines<'a>(draft: &QuoteDraft, lines: impl IntoIterator<Item = &'a LineItem>) -> Self {
        let customer = draft.customer.as_ref();
        Self {
            customer_data: CustomerData::from_draft(draft),
            delivery_type: draft.delivery_type,
            cart: lines.into_iter().map(|line| PricingLine::from_line(line, customer)).collect(),
        }
    }

    /// Only the lines added this session that still lack a price.
    pub fn for_unpriced(draft: &QuoteDraft) -> Self {
        Self::for_lines(draft, draft.unpriced_lines())
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }
}

/// A priced line echoed back by the pricing service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricedItem {
    pub sku: String,
    pub sqft_sheet: f64,
    /// Per square foot for glass, per unit otherwise.
    #[serde(rename = "UnitPrice")]
    pub unit_price: Decimal,
    pub unit: Option<String>,
    pub product_weight: Option<f64>,
    #[serde(rename = "variantCode", alias = "VariantCode")]
    pub variant_code: Option<String>,
}

impl PricedItem {
    pub fn new(sku: impl Into<String>, sqft_sheet: f64, unit_price: Decimal) -> Self {
        Self { sku: sku.into(), sqft_sheet, unit_price, ..Self::default() }
    }

    pub fn pricing_key(&self) -> PricingKey {
        PricingKey::of_priced(self)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingResponse {
    pub items: Vec<PricedItem>,
    pub totals: BTreeMap<String, Decimal>,
}
