use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::quote::{QuoteDraft, TotalsPatch};
use crate::pricing::rounding::round_money;

pub const DEFAULT_VAT_RATE: Decimal = Decimal::from_parts(7, 0, 0, false, 2);

/// How the summary screen arrives at totals for a draft.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsStrategy {
    /// Every line already carries a price; totals are recomputed in place.
    LocalRecompute,
    /// Some lines were added this session and must be priced first.
    RemotePricing,
}

pub fn has_unpriced_lines(draft: &QuoteDraft) -> bool {
    draft.has_unpriced_lines()
}

pub fn select_strategy(draft: &QuoteDraft) -> TotalsStrategy {
    if has_unpriced_lines(draft) {
        TotalsStrategy::RemotePricing
    } else {
        TotalsStrategy::LocalRecompute
    }
}

pub fn cart_subtotal(draft: &QuoteDraft) -> Decimal {
    draft.cart.iter().map(|line| line.effective_line_total()).sum()
}

/// Prices are VAT-inclusive: the VAT share is carved out of the gross amount.
pub fn compute_local_totals(draft: &QuoteDraft, vat_rate: Decimal) -> TotalsPatch {
    let shipping =
        if draft.is_delivery() { draft.shipping.customer_pay } else { Decimal::ZERO };
    let gross = cart_subtotal(draft) + shipping;
    let vat = round_money(gross * vat_rate);

    TotalsPatch {
        ex_vat: Some(gross - vat),
        vat: Some(vat),
        grand_total: Some(gross),
        shipping_customer_pay: Some(shipping),
        ..TotalsPatch::default()
    }
}

/// Reads the totals a pricing service reports for a freshly priced cart. Known
/// figures map onto totals fields and anything else is kept in `extra`. Returns
/// `None` when none of ex-VAT, VAT or grand total is present.
pub fn totals_from_service(figures: &BTreeMap<String, Decimal>) -> Option<TotalsPatch> {
    let mut patch = TotalsPatch::default();
    for (key, value) in figures {
        let value = *value;
        match key.as_str() {
            "subtotal" | "exVat" | "ex_vat" => patch.ex_vat = Some(value),
            "vat" => patch.vat = Some(value),
            "total" | "grandTotal" | "grand_total" => patch.grand_total = Some(value),
            "shippingCustomerPay" | "shipping_customer_pay" => {
                patch.shipping_customer_pay = Some(value)
            }
            _ => {
                patch.extra.insert(key.clone(), value);
            }
        }
    }

    let reported = patch.ex_vat.is_some() || patch.vat.is_some() || patch.grand_total.is_some();
    reported.then_some(patch)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use std::collections::BTreeMap;

    use super::{
        compute_local_totals, select_strategy, totals_from_service, TotalsStrategy,
        DEFAULT_VAT_RATE,
    };
    use crate::domain::line::{LineItem, LineSource};
    use crate::domain::quote::{DeliveryType, QuoteDraft, ShippingInfo};

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).expect("decimal literal")
    }

    fn priced(sku: &str, qty: u32, price: &str) -> LineItem {
        let mut line = LineItem::new(sku, sku, qty).with_unit_price(dec(price));
        line.source = LineSource::Db;
        line.needs_pricing = false;
        line
    }

    #[test]
    fn default_vat_rate_is_seven_percent() {
        assert_eq!(DEFAULT_VAT_RATE, dec("0.07"));
    }

    #[test]
    fn strategy_depends_on_unpriced_session_lines() {
        let mut draft = QuoteDraft { cart: vec![priced("S100", 1, "120")], ..QuoteDraft::default() };
        assert_eq!(select_strategy(&draft), TotalsStrategy::LocalRecompute);

        draft.cart.push(LineItem::new("E200", "Handle", 1));
        assert_eq!(select_strategy(&draft), TotalsStrategy::RemotePricing);
    }

    #[test]
    fn vat_is_carved_out_of_gross_including_delivery() {
        let draft = QuoteDraft {
            delivery_type: DeliveryType::Delivery,
            shipping: ShippingInfo { customer_pay: dec("70.5"), ..ShippingInfo::default() },
            cart: vec![priced("S100", 3, "120"), priced("E200", 2, "300")],
            ..QuoteDraft::default()
        };

        let totals = compute_local_totals(&draft, DEFAULT_VAT_RATE);

        // gross = 360 + 600 + 70.5 = 1030.5; vat = 72.135 -> 72.14
        assert_eq!(totals.grand_total, Some(dec("1030.5")));
        assert_eq!(totals.vat, Some(dec("72.14")));
        assert_eq!(totals.ex_vat, Some(dec("958.36")));
    }

    #[test]
    fn pickup_ignores_shipping() {
        let draft = QuoteDraft {
            shipping: ShippingInfo { customer_pay: dec("500"), ..ShippingInfo::default() },
            cart: vec![priced("S100", 1, "100")],
            ..QuoteDraft::default()
        };

        let totals = compute_local_totals(&draft, DEFAULT_VAT_RATE);
        assert_eq!(totals.grand_total, Some(dec("100")));
        assert_eq!(totals.vat, Some(dec("7")));
        assert_eq!(totals.shipping_customer_pay, Some(Decimal::ZERO));
    }

    #[test]
    fn service_totals_map_onto_fields() {
        let figures: BTreeMap<String, Decimal> = [
            ("subtotal", "89"),
            ("vat", "6"),
            ("total", "95"),
            ("shippingCustomerPay", "0"),
            ("profit", "12.5"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_owned(), dec(value)))
        .collect();

        let patch = totals_from_service(&figures).expect("headline figures present");
        assert_eq!(patch.ex_vat, Some(dec("89")));
        assert_eq!(patch.grand_total, Some(dec("95")));
        assert_eq!(patch.shipping_customer_pay, Some(Decimal::ZERO));
        assert_eq!(patch.extra.get("profit"), Some(&dec("12.5")));

        let only_extra: BTreeMap<String, Decimal> =
            [("profit".to_owned(), dec("3"))].into_iter().collect();
        assert_eq!(totals_from_service(&only_extra), None);
    }
}
