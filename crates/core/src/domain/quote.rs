use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerRef;
use crate::domain::line::{LineItem, LineSource};
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryType {
    #[default]
    Pickup,
    Delivery,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    New,
    /// A draft restored from storage.
    Open,
    Confirmed,
}

impl QuoteStatus {
    pub fn can_transition_to(self, next: QuoteStatus) -> bool {
        matches!(
            (self, next),
            (QuoteStatus::New, QuoteStatus::Open)
                | (QuoteStatus::Open, QuoteStatus::Open)
                | (QuoteStatus::New, QuoteStatus::Confirmed)
                | (QuoteStatus::Open, QuoteStatus::Confirmed)
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Totals {
    pub ex_vat: Decimal,
    pub vat: Decimal,
    pub grand_total: Decimal,
    pub shipping_raw: Decimal,
    pub shipping_customer_pay: Decimal,
    /// Additional figures returned by the pricing service (profit, product total, ...).
    pub extra: BTreeMap<String, Decimal>,
}

/// Partial totals update; absent fields keep their current value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotalsPatch {
    #[serde(alias = "exVat")]
    pub ex_vat: Option<Decimal>,
    pub vat: Option<Decimal>,
    #[serde(alias = "grandTotal")]
    pub grand_total: Option<Decimal>,
    #[serde(alias = "shippingRaw")]
    pub shipping_raw: Option<Decimal>,
    #[serde(alias = "shippingCustomerPay")]
    pub shipping_customer_pay: Option<Decimal>,
    pub extra: BTreeMap<String, Decimal>,
}

impl Totals {
    pub fn merge(&mut self, patch: TotalsPatch) {
        if let Some(ex_vat) = patch.ex_vat {
            self.ex_vat = ex_vat;
        }
        if let Some(vat) = patch.vat {
            self.vat = vat;
        }
        if let Some(grand_total) = patch.grand_total {
            self.grand_total = grand_total;
        }
        if let Some(shipping_raw) = patch.shipping_raw {
            self.shipping_raw = shipping_raw;
        }
        if let Some(shipping_customer_pay) = patch.shipping_customer_pay {
            self.shipping_customer_pay = shipping_customer_pay;
        }
        self.extra.extend(patch.extra);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingInfo {
    pub cost: Decimal,
    pub distance: Option<f64>,
    pub customer_pay: Decimal,
    pub company_pay: Decimal,
    pub vehicle_type: Option<String>,
    pub unload_hours: Option<f64>,
    pub staff_count: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingPatch {
    pub cost: Option<Decimal>,
    pub distance: Option<f64>,
    pub customer_pay: Option<Decimal>,
    pub company_pay: Option<Decimal>,
    pub vehicle_type: Option<String>,
    pub unload_hours: Option<f64>,
    pub staff_count: Option<u32>,
}

impl ShippingInfo {
    pub fn merge(&mut self, patch: ShippingPatch) {
        if let Some(cost) = patch.cost {
            self.cost = cost;
        }
        if let Some(distance) = patch.distance {
            self.distance = Some(distance);
        }
        if let Some(customer_pay) = patch.customer_pay {
            self.customer_pay = customer_pay;
        }
        if let Some(company_pay) = patch.company_pay {
            self.company_pay = company_pay;
        }
        if let Some(vehicle_type) = patch.vehicle_type {
            self.vehicle_type = Some(vehicle_type);
        }
        if let Some(unload_hours) = patch.unload_hours {
            self.unload_hours = Some(unload_hours);
        }
        if let Some(staff_count) = patch.staff_count {
            self.staff_count = Some(staff_count);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteDraft {
    pub step: u8,
    pub id: Option<String>,
    pub quote_no: Option<String>,
    pub status: QuoteStatus,
    pub customer: Option<CustomerRef>,
    pub delivery_type: DeliveryType,
    pub needs_tax: bool,
    pub bill_tax_name: String,
    pub remark: String,
    pub shipping: ShippingInfo,
    pub shipping_dirty: bool,
    pub cart: Vec<LineItem>,
    pub totals: Totals,
}

impl Default for QuoteDraft {
    fn default() -> Self {
        Self {
            step: 1,
            id: None,
            quote_no: None,
            status: QuoteStatus::New,
            customer: None,
            delivery_type: DeliveryType::Pickup,
            needs_tax: false,
            bill_tax_name: String::new(),
            remark: String::new(),
            shipping: ShippingInfo::default(),
            shipping_dirty: false,
            cart: Vec::new(),
            totals: Totals::default(),
        }
    }
}

impl QuoteDraft {
    pub fn is_delivery(&self) -> bool {
        self.delivery_type == DeliveryType::Delivery
    }

    /// Lines added this session that the pricing service has not priced yet.
    pub fn unpriced_lines(&self) -> impl Iterator<Item = &LineItem> {
        self.cart.iter().filter(|line| line.source == LineSource::Ui && line.needs_pricing)
    }

    pub fn has_unpriced_lines(&self) -> bool {
        self.unpriced_lines().next().is_some()
    }

    pub fn transition_to(&mut self, next: QuoteStatus) -> Result<(), DomainError> {
        if self.status.can_transition_to(next) {
            self.status = next;
            return Ok(());
        }

        Err(DomainError::InvalidQuoteTransition { from: self.status, to: next })
    }
}

/// A persisted draft as returned by the quotation store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DraftRecord {
    pub id: Option<String>,
    pub quote_no: Option<String>,
    pub customer: Option<CustomerRef>,
    pub cart: Vec<LineItem>,
    pub totals: Option<TotalsPatch>,
    pub shipping_company_pay: Option<Decimal>,
    pub delivery_type: Option<DeliveryType>,
    pub bill_tax_name: Option<String>,
    pub needs_tax: Option<bool>,
    pub note: Option<String>,
}
