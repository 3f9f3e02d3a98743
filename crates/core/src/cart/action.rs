use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerRef;
use crate::domain::line::LineItem;
use crate::domain::quote::{DeliveryType, DraftRecord, ShippingPatch, TotalsPatch};
use crate::errors::DomainError;
use crate::identity::{RemovalTarget, UiKey};
use crate::pricing::manual::ManualPrice;
use crate::pricing::request::PricedItem;

/// Which lines a quantity change applies to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "by", content = "key", rename_all = "snake_case")]
pub enum QtyTarget {
    /// Every line with this sku, whatever its variant or size.
    Sku(String),
    Line(UiKey),
}

impl QtyTarget {
    pub fn matches(&self, line: &LineItem) -> bool {
        match self {
            Self::Sku(sku) => line.sku == sku.trim(),
            Self::Line(key) => key.matches(line),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartAction {
    SetStep(u8),
    SetCustomer(Option<CustomerRef>),
    SetTaxDelivery { needs_tax: bool, delivery_type: DeliveryType, bill_tax_name: String },
    SetShipping(ShippingPatch),
    SetRemark(String),
    AddItem(LineItem),
    UpdateCartQty { target: QtyTarget, qty: i64 },
    RemoveItem(RemovalTarget),
    UpdateItemDescription { key: UiKey, name: String },
    ApplyPricingResult(PricedItem),
    ApplyManualPrice { key: UiKey, price: ManualPrice },
    SetCart(Vec<LineItem>),
    SetTotals(TotalsPatch),
    LoadDraft(DraftRecord),
    /// Records the number and id the quotation store assigned on save.
    MarkPersisted { quote_no: String, id: Option<String>, confirmed: bool },
    ResetQuote,
}

impl CartAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetStep(_) => "SET_STEP",
            Self::SetCustomer(_) => "SET_CUSTOMER",
            Self::SetTaxDelivery { .. } => "SET_TAX_DELIVERY",
            Self::SetShipping(_) => "SET_SHIPPING",
            Self::SetRemark(_) => "SET_REMARK",
            Self::AddItem(_) => "ADD_ITEM",
            Self::UpdateCartQty { .. } => "UPDATE_CART_QTY",
            Self::RemoveItem(_) => "REMOVE_ITEM",
            Self::UpdateItemDescription { .. } => "UPDATE_ITEM_DESCRIPTION",
            Self::ApplyPricingResult(_) => "APPLY_PRICING_RESULT",
            Self::ApplyManualPrice { .. } => "APPLY_MANUAL_PRICE",
            Self::SetCart(_) => "SET_CART",
            Self::SetTotals(_) => "SET_TOTALS",
            Self::LoadDraft(_) => "LOAD_DRAFT",
            Self::MarkPersisted { .. } => "MARK_PERSISTED",
            Self::ResetQuote => "RESET_QUOTE",
        }
    }

    /// Actions that change the cart contents and therefore invalidate a delivery quote.
    pub fn mutates_cart(&self) -> bool {
        matches!(
            self,
            Self::AddItem(_)
                | Self::UpdateCartQty { .. }
                | Self::RemoveItem(_)
                | Self::ApplyPricingResult(_)
                | Self::ApplyManualPrice { .. }
                | Self::SetCart(_)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied,
    /// The action was valid but had nothing to act on.
    Ignored,
    /// A pricing result matched no cart line.
    Unmatched,
    Rejected(DomainError),
}

impl DispatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Ignored => "ignored",
            Self::Unmatched => "unmatched",
            Self::Rejected(_) => "rejected",
        }
    }
}
