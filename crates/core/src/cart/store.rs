use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::cart::action::{CartAction, DispatchOutcome, QtyTarget};
use crate::domain::customer::CustomerRef;
use crate::domain::line::{LineItem, LineSource, PriceSource};
use crate::domain::quote::{
    DeliveryType, DraftRecord, QuoteDraft, QuoteStatus, ShippingInfo, Totals,
};
use crate::identity::{normalize_sqft, normalize_variant, ui_key_of, RemovalTarget, UiKey};
use crate::numeric::{clamp_qty, decimal_from_f64, finite_or_zero};
use crate::pricing::manual::ManualPrice;
use crate::pricing::request::PricedItem;

/// Step the wizard opens on when a saved draft is restored.
pub const SUMMARY_STEP: u8 = 6;

/// Applies one action to a draft and reports what happened. Drafts are only
/// modified when the outcome is `Applied`.
pub fn reduce(mut draft: QuoteDraft, action: CartAction) -> (QuoteDraft, DispatchOutcome) {
    let mutates_cart = action.mutates_cart();
    let outcome = apply(&mut draft, action);
    if mutates_cart && outcome.is_applied() {
        draft.shipping_dirty = draft.is_delivery() && !draft.cart.is_empty();
    }
    (draft, outcome)
}

fn apply(draft: &mut QuoteDraft, action: CartAction) -> DispatchOutcome {
    match action {
        CartAction::SetStep(step) => {
            draft.step = step;
            DispatchOutcome::Applied
        }
        CartAction::SetCustomer(customer) => {
            draft.customer = customer;
            DispatchOutcome::Applied
        }
        CartAction::SetTaxDelivery { needs_tax, delivery_type, bill_tax_name } => {
            draft.needs_tax = needs_tax;
            draft.delivery_type = delivery_type;
            draft.bill_tax_name = bill_tax_name;
            if delivery_type == DeliveryType::Pickup {
                draft.shipping = ShippingInfo::default();
                draft.shipping_dirty = false;
            }
            DispatchOutcome::Applied
        }
        CartAction::SetShipping(patch) => {
            draft.shipping.merge(patch);
            draft.shipping_dirty = false;
            DispatchOutcome::Applied
        }
        CartAction::SetRemark(remark) => {
            draft.remark = remark;
            DispatchOutcome::Applied
        }
        CartAction::AddItem(line) => add_item(draft, line),
        CartAction::UpdateCartQty { target, qty } => update_qty(draft, &target, qty),
        CartAction::RemoveItem(target) => remove_item(draft, &target),
        CartAction::UpdateItemDescription { key, name } => {
            match draft.cart.iter_mut().find(|line| key.matches(line)) {
                Some(line) => {
                    line.name = name;
                    DispatchOutcome::Applied
                }
                None => DispatchOutcome::Ignored,
            }
        }
        CartAction::ApplyPricingResult(item) => apply_pricing(draft, &item),
        CartAction::ApplyManualPrice { key, price } => apply_manual_price(draft, &key, &price),
        CartAction::SetCart(lines) => {
            draft.cart = coalesce(lines.into_iter().filter_map(normalize_replacement_line));
            DispatchOutcome::Applied
        }
        CartAction::SetTotals(patch) => {
            draft.totals.merge(patch);
            DispatchOutcome::Applied
        }
        CartAction::LoadDraft(record) => {
            *draft = draft_from_record(record);
            DispatchOutcome::Applied
        }
        CartAction::MarkPersisted { quote_no, id, confirmed } => {
            let next = if confirmed { QuoteStatus::Confirmed } else { QuoteStatus::Open };
            if let Err(error) = draft.transition_to(next) {
                return DispatchOutcome::Rejected(error);
            }
            draft.quote_no = Some(quote_no);
            if id.is_some() {
                draft.id = id;
            }
            DispatchOutcome::Applied
        }
        CartAction::ResetQuote => {
            *draft = QuoteDraft::default();
            DispatchOutcome::Applied
        }
    }
}

/// Brings a freshly picked line into the shape the cart stores. Returns `None`
/// for lines without a sku.
fn normalize_new_line(mut line: LineItem) -> Option<LineItem> {
    line.sku = line.sku.trim().to_owned();
    if line.sku.is_empty() {
        return None;
    }

    line.qty = line.qty.max(1);
    line.pkg_size = line.pkg_size.max(1);
    line.sqft_sheet = normalize_sqft(line.sqft_sheet);
    line.variant_code = normalize_variant(line.variant_code.as_deref());
    line.product_weight = finite_or_zero(line.product_weight);
    line.unit = line.unit.filter(|unit| !unit.trim().is_empty());
    line.source = LineSource::Ui;
    line.needs_pricing = true;
    line.is_draft_item = false;
    Some(line)
}

/// Lines handed over wholesale keep their pricing state but still get a valid
/// identity and quantity.
fn normalize_replacement_line(mut line: LineItem) -> Option<LineItem> {
    line.sku = line.sku.trim().to_owned();
    if line.sku.is_empty() {
        return None;
    }

    line.qty = line.qty.max(1);
    line.pkg_size = line.pkg_size.max(1);
    line.sqft_sheet = normalize_sqft(line.sqft_sheet);
    line.variant_code = normalize_variant(line.variant_code.as_deref());
    Some(line)
}

fn normalize_draft_line(line: LineItem) -> Option<LineItem> {
    let mut line = normalize_replacement_line(line)?;
    line.source = LineSource::Db;
    line.is_draft_item = true;
    line.needs_pricing = false;
    line.product_weight = finite_or_zero(line.product_weight);
    line.unit_price = Some(line.unit_price.unwrap_or(Decimal::ZERO));
    line.is_glass = line.is_glass_category();
    line.reprice_from_unit();
    Some(line)
}

/// Merges lines that share a ui key, summing their quantities in first-seen order.
fn coalesce(lines: impl IntoIterator<Item = LineItem>) -> Vec<LineItem> {
    let mut merged: Vec<LineItem> = Vec::new();
    for line in lines {
        let key = ui_key_of(&line);
        match merged.iter_mut().find(|existing| key.matches(existing)) {
            Some(existing) => {
                existing.qty = existing.qty.saturating_add(line.qty);
                existing.line_total = None;
            }
            None => merged.push(line),
        }
    }
    merged
}

fn add_item(draft: &mut QuoteDraft, line: LineItem) -> DispatchOutcome {
    let Some(line) = normalize_new_line(line) else {
        return DispatchOutcome::Ignored;
    };

    let key = ui_key_of(&line);
    match draft.cart.iter_mut().find(|existing| key.matches(existing)) {
        Some(existing) => {
            existing.qty = existing.qty.saturating_add(line.qty);
            existing.line_total = None;
            existing.needs_pricing = existing.source == LineSource::Ui;
            if existing.product_weight == 0.0 {
                existing.product_weight = line.product_weight;
            }
        }
        None => draft.cart.push(line),
    }
    DispatchOutcome::Applied
}

fn update_qty(draft: &mut QuoteDraft, target: &QtyTarget, requested: i64) -> DispatchOutcome {
    let qty = clamp_qty(requested);
    let mut matched = false;

    for line in draft.cart.iter_mut().filter(|line| target.matches(line)) {
        matched = true;
        line.qty = qty;
        line.line_total = if line.unit_price.is_some() || line.price_per_sheet.is_some() {
            Some(line.display_unit_price() * Decimal::from(qty))
        } else {
            None
        };
    }

    if matched {
        DispatchOutcome::Applied
    } else {
        DispatchOutcome::Ignored
    }
}

fn remove_item(draft: &mut QuoteDraft, target: &RemovalTarget) -> DispatchOutcome {
    let before = draft.cart.len();
    draft.cart.retain(|line| !target.matches(line));
    if draft.cart.len() == before {
        return DispatchOutcome::Ignored;
    }

    if draft.cart.is_empty() {
        draft.delivery_type = DeliveryType::Pickup;
        draft.totals = Totals::default();
        draft.shipping = ShippingInfo::default();
        draft.shipping_dirty = false;
    }
    DispatchOutcome::Applied
}

fn apply_pricing(draft: &mut QuoteDraft, item: &PricedItem) -> DispatchOutcome {
    let key = item.pricing_key();
    let mut matched = false;

    for line in draft.cart.iter_mut().filter(|line| key.matches(line)) {
        matched = true;
        line.unit_price = Some(item.unit_price);
        line.system_price = Some(item.unit_price);
        line.price_source = PriceSource::System;

        if line.sells_by_sheet() {
            let per_sheet = item.unit_price * decimal_from_f64(line.sqft());
            line.price_per_sheet = Some(per_sheet);
            line.line_total = Some(per_sheet * Decimal::from(line.qty));
        } else {
            line.price_per_sheet = None;
            line.line_total = Some(item.unit_price * Decimal::from(line.qty));
        }

        let unit = item.unit.as_deref().map(str::trim).unwrap_or_default();
        if !unit.is_empty() {
            line.unit = Some(unit.to_owned());
        } else if line.unit.as_deref() == Some("-") {
            line.unit = None;
        }
        if let Some(weight) = item.product_weight {
            line.product_weight = finite_or_zero(weight);
        }
        if line.variant_code.is_none() {
            line.variant_code = normalize_variant(item.variant_code.as_deref());
        }
        line.needs_pricing = false;
    }

    if !matched {
        return DispatchOutcome::Unmatched;
    }

    // a variant code filled in from pricing can make two rows identical
    let cart = std::mem::take(&mut draft.cart);
    draft.cart = coalesce(cart);
    DispatchOutcome::Applied
}

fn apply_manual_price(draft: &mut QuoteDraft, key: &UiKey, price: &ManualPrice) -> DispatchOutcome {
    match draft.cart.iter_mut().find(|line| key.matches(line)) {
        Some(line) => {
            price.apply(line);
            DispatchOutcome::Applied
        }
        None => DispatchOutcome::Ignored,
    }
}

fn normalize_customer(mut customer: CustomerRef) -> CustomerRef {
    if customer.code.trim().is_empty() {
        customer.code = customer.id.clone();
    }
    customer.needs_hydrate = !customer.customer_code().is_empty();
    customer
}

fn draft_from_record(record: DraftRecord) -> QuoteDraft {
    let totals_patch = record.totals.unwrap_or_default();
    let shipping_raw = totals_patch.shipping_raw.unwrap_or(Decimal::ZERO);
    let shipping_customer_pay = totals_patch.shipping_customer_pay.unwrap_or(Decimal::ZERO);

    QuoteDraft {
        step: SUMMARY_STEP,
        id: record.id,
        quote_no: record.quote_no,
        status: QuoteStatus::Open,
        customer: record.customer.map(normalize_customer),
        delivery_type: record.delivery_type.unwrap_or_default(),
        needs_tax: record.needs_tax.unwrap_or(false),
        bill_tax_name: record.bill_tax_name.unwrap_or_default(),
        remark: record.note.unwrap_or_default(),
        shipping: ShippingInfo {
            cost: shipping_raw,
            customer_pay: shipping_customer_pay,
            company_pay: record.shipping_company_pay.unwrap_or(Decimal::ZERO),
            ..ShippingInfo::default()
        },
        shipping_dirty: false,
        cart: coalesce(record.cart.into_iter().filter_map(normalize_draft_line)),
        totals: Totals {
            ex_vat: totals_patch.ex_vat.unwrap_or(Decimal::ZERO),
            vat: totals_patch.vat.unwrap_or(Decimal::ZERO),
            grand_total: totals_patch.grand_total.unwrap_or(Decimal::ZERO),
            shipping_raw,
            shipping_customer_pay,
            extra: totals_patch.extra,
        },
    }
}

/// Single-writer owner of one quote draft.
#[derive(Clone, Debug, Default)]
pub struct CartStore {
    draft: QuoteDraft,
}

impl CartStore {
    pub fn new(draft: QuoteDraft) -> Self {
        Self { draft }
    }

    pub fn draft(&self) -> &QuoteDraft {
        &self.draft
    }

    pub fn into_draft(self) -> QuoteDraft {
        self.draft
    }

    pub fn dispatch(&mut self, action: CartAction) -> DispatchOutcome {
        let name = action.name();
        let sku = match &action {
            CartAction::AddItem(line) => Some(line.sku.clone()),
            CartAction::ApplyPricingResult(item) => Some(item.sku.clone()),
            _ => None,
        };

        let (draft, outcome) = reduce(std::mem::take(&mut self.draft), action);
        self.draft = draft;

        match &outcome {
            DispatchOutcome::Applied => debug!(
                event_name = "cart.action_applied",
                action = name,
                sku = sku.as_deref().unwrap_or(""),
                cart_len = self.draft.cart.len(),
                "cart action applied"
            ),
            DispatchOutcome::Ignored => debug!(
                event_name = "cart.action_ignored",
                action = name,
                sku = sku.as_deref().unwrap_or(""),
                "cart action had no effect"
            ),
            DispatchOutcome::Unmatched => warn!(
                event_name = "cart.pricing_unmatched",
                action = name,
                sku = sku.as_deref().unwrap_or(""),
                "priced item matched no cart line"
            ),
            DispatchOutcome::Rejected(error) => warn!(
                event_name = "cart.action_rejected",
                action = name,
                error = %error,
                "cart action rejected"
            ),
        }

        outcome
    }

    pub fn dispatch_with_audit<S>(
        &mut self,
        action: CartAction,
        sink: &S,
        audit: &AuditContext,
    ) -> DispatchOutcome
    where
        S: AuditSink + ?Sized,
    {
        let name = action.name();
        let outcome = self.dispatch(action);

        let (event_type, audit_outcome) = match &outcome {
            DispatchOutcome::Applied => ("cart.action_applied", AuditOutcome::Success),
            DispatchOutcome::Ignored => ("cart.action_ignored", AuditOutcome::Ignored),
            DispatchOutcome::Unmatched => ("cart.pricing_unmatched", AuditOutcome::Ignored),
            DispatchOutcome::Rejected(_) => ("cart.action_rejected", AuditOutcome::Rejected),
        };
        let category = if name == "APPLY_PRICING_RESULT" || name == "APPLY_MANUAL_PRICE" {
            AuditCategory::Pricing
        } else {
            AuditCategory::Cart
        };

        let mut event = AuditEvent::new(audit, event_type, category, audit_outcome)
            .with_metadata("action", name)
            .with_metadata("cart_len", self.draft.cart.len().to_string());
        if let DispatchOutcome::Rejected(error) = &outcome {
            event = event.with_metadata("error", error.to_string());
        }
        sink.emit(event);

        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::{reduce, CartStore};
    use crate::audit::{AuditContext, AuditOutcome, InMemoryAuditSink};
    use crate::cart::action::{CartAction, DispatchOutcome, QtyTarget};
    use crate::domain::customer::CustomerRef;
    use crate::domain::line::{LineItem, LineSource, PriceSource};
    use crate::domain::quote::{
        DeliveryType, DraftRecord, QuoteDraft, QuoteStatus, ShippingPatch, TotalsPatch,
    };
    use crate::errors::DomainError;
    use crate::identity::{ui_key_of, PricingKey, RemovalTarget, UiKey};
    use crate::pricing::manual::ManualPrice;
    use crate::pricing::request::PricedItem;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).expect("decimal literal")
    }

    fn glass(variant: &str, sqft: f64, qty: u32) -> LineItem {
        LineItem::new("G01010010106048072", "Clear 6mm", qty).with_sqft(sqft).with_variant(variant)
    }

    fn assert_unique_keys(draft: &QuoteDraft) {
        for (index, line) in draft.cart.iter().enumerate() {
            assert!(line.qty >= 1, "qty below one for {}", line.sku);
            let key = ui_key_of(line);
            assert!(
                draft.cart.iter().skip(index + 1).all(|other| !key.matches(other)),
                "duplicate ui key {key}"
            );
        }
    }

    #[test]
    fn adding_the_same_pick_twice_merges_quantities() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::AddItem(glass("V1", 3.0, 2)));
        store.dispatch(CartAction::AddItem(glass("V1", 3.0, 3)));

        let draft = store.draft();
        assert_eq!(draft.cart.len(), 1);
        assert_eq!(draft.cart[0].qty, 5);
        assert!(draft.cart[0].needs_pricing);
        assert_unique_keys(draft);
    }

    #[test]
    fn different_variants_or_sizes_stay_separate() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::AddItem(glass("V1", 3.0, 1)));
        store.dispatch(CartAction::AddItem(glass("V2", 3.0, 1)));
        store.dispatch(CartAction::AddItem(glass("V1", 6.0, 1)));

        assert_eq!(store.draft().cart.len(), 3);
        assert_unique_keys(store.draft());
    }

    #[test]
    fn merging_into_restored_line_keeps_it_priced() {
        let record = DraftRecord {
            cart: vec![LineItem::new("S100", "Silicone", 2).with_unit_price(dec("120"))],
            ..DraftRecord::default()
        };
        let mut store = CartStore::default();
        store.dispatch(CartAction::LoadDraft(record));
        store.dispatch(CartAction::AddItem(LineItem::new("S100", "Silicone", 1)));

        let line = &store.draft().cart[0];
        assert_eq!(line.qty, 3);
        assert_eq!(line.source, LineSource::Db);
        assert!(!line.needs_pricing);
        assert_eq!(line.line_total, None);
        assert_eq!(line.effective_line_total(), dec("360"));
    }

    #[test]
    fn sku_less_lines_are_ignored() {
        let mut store = CartStore::default();
        let outcome = store.dispatch(CartAction::AddItem(LineItem::new("  ", "Nothing", 1)));

        assert_eq!(outcome, DispatchOutcome::Ignored);
        assert!(store.draft().cart.is_empty());
    }

    #[test]
    fn zero_quantity_is_clamped_on_add() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::AddItem(LineItem::new("S100", "Silicone", 0)));
        assert_eq!(store.draft().cart[0].qty, 1);
    }

    #[test]
    fn negative_quantity_update_clamps_to_one() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::AddItem(
            LineItem::new("S100", "Silicone", 4).with_unit_price(dec("120")),
        ));

        let outcome = store.dispatch(CartAction::UpdateCartQty {
            target: QtyTarget::Sku("S100".to_owned()),
            qty: -5,
        });

        assert_eq!(outcome, DispatchOutcome::Applied);
        assert_eq!(store.draft().cart[0].qty, 1);
        assert_eq!(store.draft().cart[0].line_total, Some(dec("120")));
    }

    #[test]
    fn precise_quantity_update_touches_one_variant() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::AddItem(glass("V1", 3.0, 1)));
        store.dispatch(CartAction::AddItem(glass("V2", 3.0, 1)));

        store.dispatch(CartAction::UpdateCartQty {
            target: QtyTarget::Line(UiKey::new("G01010010106048072", Some("V2"), 3.0)),
            qty: 7,
        });
        assert_eq!(store.draft().cart[0].qty, 1);
        assert_eq!(store.draft().cart[1].qty, 7);

        store.dispatch(CartAction::UpdateCartQty {
            target: QtyTarget::Sku("G01010010106048072".to_owned()),
            qty: 2,
        });
        assert!(store.draft().cart.iter().all(|line| line.qty == 2));
    }

    #[test]
    fn quantity_update_uses_sheet_price_for_glass() {
        let mut line = glass("V1", 2.5, 1).with_unit_price(dec("40"));
        line.reprice_from_unit();
        let mut store = CartStore::new(QuoteDraft { cart: vec![line], ..QuoteDraft::default() });

        store.dispatch(CartAction::UpdateCartQty {
            target: QtyTarget::Line(UiKey::new("G01010010106048072", Some("V1"), 2.5)),
            qty: 3,
        });
        assert_eq!(store.draft().cart[0].line_total, Some(dec("300")));
    }

    #[test]
    fn removal_by_ui_key_leaves_other_sizes() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::AddItem(glass("V1", 3.0, 1)));
        store.dispatch(CartAction::AddItem(glass("V1", 6.0, 1)));

        let outcome = store.dispatch(CartAction::RemoveItem(RemovalTarget::Line(UiKey::new(
            "G01010010106048072",
            Some("V1"),
            3.0,
        ))));

        assert_eq!(outcome, DispatchOutcome::Applied);
        assert_eq!(store.draft().cart.len(), 1);
        assert_eq!(store.draft().cart[0].sqft_sheet, 6.0);
    }

    #[test]
    fn legacy_removal_forms_are_supported() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::AddItem(glass("V1", 3.0, 1)));
        store.dispatch(CartAction::AddItem(glass("V2", 3.0, 1)));
        store.dispatch(CartAction::AddItem(LineItem::new("S100", "Silicone", 1)));

        store.dispatch(CartAction::RemoveItem(RemovalTarget::Pricing(PricingKey::new(
            "G01010010106048072",
            3.0,
        ))));
        assert_eq!(store.draft().cart.len(), 1);

        let outcome = store.dispatch(CartAction::RemoveItem(
            "S999".parse().expect("bare sku target"),
        ));
        assert_eq!(outcome, DispatchOutcome::Ignored);
    }

    #[test]
    fn removing_last_line_resets_delivery_and_money() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::SetTaxDelivery {
            needs_tax: true,
            delivery_type: DeliveryType::Delivery,
            bill_tax_name: "Siam Glass Co.".to_owned(),
        });
        store.dispatch(CartAction::AddItem(LineItem::new("S100", "Silicone", 1)));
        store.dispatch(CartAction::SetShipping(ShippingPatch {
            customer_pay: Some(dec("500")),
            ..ShippingPatch::default()
        }));
        store.dispatch(CartAction::SetTotals(TotalsPatch {
            grand_total: Some(dec("620")),
            ..TotalsPatch::default()
        }));

        store.dispatch(CartAction::RemoveItem(RemovalTarget::Sku("S100".to_owned())));

        let draft = store.draft();
        assert!(draft.cart.is_empty());
        assert_eq!(draft.delivery_type, DeliveryType::Pickup);
        assert_eq!(draft.totals.grand_total, Decimal::ZERO);
        assert_eq!(draft.shipping.customer_pay, Decimal::ZERO);
        assert!(!draft.shipping_dirty);
        assert!(draft.needs_tax);
    }

    #[test]
    fn cart_edits_mark_delivery_shipping_stale() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::AddItem(LineItem::new("S100", "Silicone", 1)));
        assert!(!store.draft().shipping_dirty);

        store.dispatch(CartAction::SetTaxDelivery {
            needs_tax: false,
            delivery_type: DeliveryType::Delivery,
            bill_tax_name: String::new(),
        });
        store.dispatch(CartAction::AddItem(LineItem::new("E200", "Handle", 1)));
        assert!(store.draft().shipping_dirty);

        store.dispatch(CartAction::SetShipping(ShippingPatch {
            cost: Some(dec("850")),
            ..ShippingPatch::default()
        }));
        assert!(!store.draft().shipping_dirty);

        store.dispatch(CartAction::SetTaxDelivery {
            needs_tax: false,
            delivery_type: DeliveryType::Pickup,
            bill_tax_name: String::new(),
        });
        assert_eq!(store.draft().shipping.cost, Decimal::ZERO);
    }

    #[test]
    fn pricing_result_reattaches_by_sku_and_area() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::AddItem(glass("V1", 3.0, 2)));
        store.dispatch(CartAction::AddItem(LineItem::new("S100", "Silicone", 2)));

        let outcome = store.dispatch(CartAction::ApplyPricingResult(PricedItem::new(
            "G01010010106048072",
            3.0,
            dec("45"),
        )));
        assert_eq!(outcome, DispatchOutcome::Applied);

        let line = &store.draft().cart[0];
        assert_eq!(line.unit_price, Some(dec("45")));
        assert_eq!(line.price_per_sheet, Some(dec("135")));
        assert_eq!(line.line_total, Some(dec("270")));
        assert_eq!(line.qty, 2);
        assert!(!line.needs_pricing);
        assert!(store.draft().cart[1].needs_pricing);
    }

    #[test]
    fn pricing_result_fills_unit_and_weight() {
        let mut store = CartStore::default();
        let mut line = LineItem::new("A1020", "Frame", 2);
        line.unit = Some("-".to_owned());
        store.dispatch(CartAction::AddItem(line));

        store.dispatch(CartAction::ApplyPricingResult(PricedItem {
            product_weight: Some(2.93),
            ..PricedItem::new("A1020", 0.0, dec("450"))
        }));
        let line = &store.draft().cart[0];
        assert_eq!(line.unit, None);
        assert_eq!(line.product_weight, 2.93);
        assert_eq!(line.price_per_sheet, None);
        assert_eq!(line.line_total, Some(dec("900")));
    }

    #[test]
    fn unmatched_pricing_result_leaves_draft_untouched() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::AddItem(glass("V1", 3.0, 1)));
        let before = store.draft().clone();

        let outcome = store.dispatch(CartAction::ApplyPricingResult(PricedItem::new(
            "G01010010106048072",
            6.0,
            dec("45"),
        )));

        assert_eq!(outcome, DispatchOutcome::Unmatched);
        assert_eq!(store.draft(), &before);
    }

    #[test]
    fn shared_pricing_key_prices_both_variants() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::AddItem(glass("V1", 3.0, 1)));
        store.dispatch(CartAction::AddItem(glass("V2", 3.0, 1)));

        store.dispatch(CartAction::ApplyPricingResult(PricedItem::new(
            "G01010010106048072",
            3.0,
            dec("50"),
        )));
        assert!(store.draft().cart.iter().all(|line| line.unit_price == Some(dec("50"))));
    }

    #[test]
    fn manual_price_targets_one_line() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::AddItem(glass("V1", 3.0, 1)));
        store.dispatch(CartAction::AddItem(glass("V2", 3.0, 1)));

        let outcome = store.dispatch(CartAction::ApplyManualPrice {
            key: UiKey::new("G01010010106048072", Some("V2"), 3.0),
            price: ManualPrice::PerSqft { price: dec("38.1") },
        });

        assert_eq!(outcome, DispatchOutcome::Applied);
        assert_eq!(store.draft().cart[0].price_source, PriceSource::System);
        assert_eq!(store.draft().cart[1].price_source, PriceSource::Manual);
        assert_eq!(store.draft().cart[1].price_per_sheet, Some(dec("114.5")));
    }

    #[test]
    fn description_update_renames_exact_line() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::AddItem(glass("V1", 3.0, 1)));
        store.dispatch(CartAction::AddItem(glass("V2", 3.0, 1)));

        store.dispatch(CartAction::UpdateItemDescription {
            key: UiKey::new("G01010010106048072", Some("V1"), 3.0),
            name: "Clear 6mm, polished edge".to_owned(),
        });
        assert_eq!(store.draft().cart[0].name, "Clear 6mm, polished edge");
        assert_eq!(store.draft().cart[1].name, "Clear 6mm");
    }

    #[test]
    fn set_cart_coalesces_duplicates_and_drops_blank_skus() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::SetCart(vec![
            glass("V1", 3.0, 1),
            LineItem::new("", "Blank", 1),
            glass("V1", 3.0, 4),
        ]));

        assert_eq!(store.draft().cart.len(), 1);
        assert_eq!(store.draft().cart[0].qty, 5);
    }

    #[test]
    fn set_totals_is_a_shallow_merge() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::SetTotals(TotalsPatch {
            vat: Some(dec("7")),
            grand_total: Some(dec("107")),
            ..TotalsPatch::default()
        }));
        store.dispatch(CartAction::SetTotals(TotalsPatch {
            grand_total: Some(dec("214")),
            ..TotalsPatch::default()
        }));

        assert_eq!(store.draft().totals.vat, dec("7"));
        assert_eq!(store.draft().totals.grand_total, dec("214"));
    }

    #[test]
    fn load_draft_replaces_the_whole_quote() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::AddItem(LineItem::new("S100", "Silicone", 1)));
        store.dispatch(CartAction::SetRemark("stale remark".to_owned()));
        store.dispatch(CartAction::SetTotals(TotalsPatch {
            vat: Some(dec("99")),
            ..TotalsPatch::default()
        }));

        let record: DraftRecord = serde_json::from_str(
            r#"{
                "id": "d-17",
                "quoteNo": "QT-2026-0017",
                "customer": {"id": "C-100", "name": "Siam Glass"},
                "deliveryType": "DELIVERY",
                "note": "call before delivery",
                "totals": {"exVat": "930", "grandTotal": "1000", "shippingCustomerPay": "200"},
                "cart": [
                    {"sku": "G01010010106024060", "name": "Clear", "qty": 2, "sqft_sheet": 10.0, "unit_price": "45"},
                    {"sku": "S100", "name": "Silicone", "qty": 1, "unit_price": "100"},
                    {"sku": "", "name": "Broken"}
                ]
            }"#,
        )
        .expect("draft record json");

        let outcome = store.dispatch(CartAction::LoadDraft(record));
        assert_eq!(outcome, DispatchOutcome::Applied);

        let draft = store.draft();
        assert_eq!(draft.status, QuoteStatus::Open);
        assert_eq!(draft.step, 6);
        assert_eq!(draft.quote_no.as_deref(), Some("QT-2026-0017"));
        assert_eq!(draft.remark, "call before delivery");
        assert_eq!(draft.delivery_type, DeliveryType::Delivery);
        assert_eq!(draft.totals.vat, Decimal::ZERO);
        assert_eq!(draft.totals.grand_total, dec("1000"));
        assert_eq!(draft.shipping.customer_pay, dec("200"));
        assert!(!draft.shipping_dirty);

        let customer = draft.customer.as_ref().expect("customer restored");
        assert_eq!(customer.code, "C-100");
        assert!(customer.needs_hydrate);

        assert_eq!(draft.cart.len(), 2);
        let glass = &draft.cart[0];
        assert_eq!(glass.source, LineSource::Db);
        assert!(glass.is_draft_item);
        assert!(!glass.needs_pricing);
        assert_eq!(glass.price_per_sheet, Some(dec("450")));
        assert_eq!(glass.line_total, Some(dec("900")));
        assert_eq!(draft.cart[1].line_total, Some(dec("100")));
        assert!(!draft.has_unpriced_lines());
    }

    #[test]
    fn load_draft_reads_persisted_line_field_names() {
        let record: DraftRecord = serde_json::from_str(
            r#"{
                "id": "d-18",
                "cart": [
                    {"sku": "G001", "name": "Clear", "qty": 1, "sqft": 6, "variantCode": "V1", "UnitPrice": "45"},
                    {"sku": "G001", "name": "Clear", "qty": 2, "sqft": 6, "VariantCode": "V2", "price": "50", "UnitPrice": "1"},
                    {"sku": "G001", "name": "Clear", "qty": 1, "sqft_sheet": 3, "sqft": 9, "variant_code": "V1", "unit_price": "40"}
                ]
            }"#,
        )
        .expect("draft record json");

        let mut store = CartStore::default();
        store.dispatch(CartAction::LoadDraft(record));

        let cart = &store.draft().cart;
        assert_eq!(cart.len(), 3, "distinct variants and sizes must not merge");
        assert_eq!(ui_key_of(&cart[0]), UiKey::new("G001", Some("V1"), 6.0));
        assert_eq!(cart[0].unit_price, Some(dec("45")));
        assert_eq!(cart[0].price_per_sheet, Some(dec("270")));
        assert_eq!(cart[0].line_total, Some(dec("270")));

        assert_eq!(cart[1].variant_code.as_deref(), Some("V2"));
        assert_eq!(cart[1].unit_price, Some(dec("50")));
        assert_eq!(cart[1].line_total, Some(dec("600")));

        assert_eq!(cart[2].sqft_sheet, 3.0);
        assert_eq!(cart[2].line_total, Some(dec("120")));
        assert_unique_keys(store.draft());
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut store = CartStore::default();
        store.dispatch(CartAction::SetStep(4));
        store.dispatch(CartAction::SetCustomer(Some(CustomerRef {
            id: "C-1".to_owned(),
            ..CustomerRef::default()
        })));
        store.dispatch(CartAction::AddItem(LineItem::new("S100", "Silicone", 1)));

        store.dispatch(CartAction::ResetQuote);
        assert_eq!(store.draft(), &QuoteDraft::default());
    }

    #[test]
    fn confirmed_quote_cannot_be_saved_as_open_again() {
        let mut store = CartStore::default();
        let first = store.dispatch(CartAction::MarkPersisted {
            quote_no: "QT-1".to_owned(),
            id: Some("d-1".to_owned()),
            confirmed: true,
        });
        assert_eq!(first, DispatchOutcome::Applied);

        let second = store.dispatch(CartAction::MarkPersisted {
            quote_no: "QT-1".to_owned(),
            id: None,
            confirmed: false,
        });
        assert!(matches!(
            second,
            DispatchOutcome::Rejected(DomainError::InvalidQuoteTransition { .. })
        ));
        assert_eq!(store.draft().status, QuoteStatus::Confirmed);
        assert_eq!(store.draft().id.as_deref(), Some("d-1"));
    }

    #[test]
    fn reduce_is_pure_over_owned_drafts() {
        let draft = QuoteDraft::default();
        let (next, outcome) = reduce(draft.clone(), CartAction::SetRemark("rush".to_owned()));

        assert_eq!(outcome, DispatchOutcome::Applied);
        assert_eq!(next.remark, "rush");
        assert_eq!(draft.remark, "");
    }

    #[test]
    fn audited_dispatch_records_outcomes() {
        let sink = InMemoryAuditSink::default();
        let context = AuditContext::new(None, Some("sess-1".to_owned()), "req-9", "sales-desk");
        let mut store = CartStore::default();

        store.dispatch_with_audit(
            CartAction::AddItem(LineItem::new("S100", "Silicone", 1)),
            &sink,
            &context,
        );
        store.dispatch_with_audit(
            CartAction::ApplyPricingResult(PricedItem::new("S999", 0.0, dec("1"))),
            &sink,
            &context,
        );

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "cart.action_applied");
        assert_eq!(events[0].metadata.get("action").map(String::as_str), Some("ADD_ITEM"));
        assert_eq!(events[1].event_type, "cart.pricing_unmatched");
        assert_eq!(events[1].outcome, AuditOutcome::Ignored);
    }

    #[test]
    fn key_uniqueness_holds_across_a_mixed_session() {
        let mut store = CartStore::default();
        let actions = vec![
            CartAction::AddItem(glass("V1", 3.0, 1)),
            CartAction::AddItem(glass("", 3.0, 1)),
            CartAction::AddItem(glass("V1", 3.0, 2)),
            CartAction::ApplyPricingResult(PricedItem {
                variant_code: Some("V1".to_owned()),
                ..PricedItem::new("G01010010106048072", 3.0, dec("45"))
            }),
            CartAction::UpdateCartQty { target: QtyTarget::Sku("G01010010106048072".to_owned()), qty: 0 },
            CartAction::SetCart(vec![glass("V9", 1.0, 1), glass("V9", 1.0, 1)]),
        ];

        for action in actions {
            store.dispatch(action);
            assert_unique_keys(store.draft());
        }
    }
}
