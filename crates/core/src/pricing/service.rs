use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cart::{CartAction, CartStore, DispatchOutcome};
use crate::domain::quote::TotalsPatch;
use crate::errors::ApplicationError;
use crate::pricing::request::{PricedItem, PricingRequest, PricingResponse};
use crate::pricing::totals::{
    compute_local_totals, select_strategy, totals_from_service, TotalsStrategy,
};

pub trait PricingService: Send + Sync {
    fn price(&self, request: &PricingRequest) -> Result<PricingResponse, ApplicationError>;
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceListEntry {
    /// Per square foot for glass, per unit otherwise.
    pub unit_price: Decimal,
    pub unit: Option<String>,
    pub product_weight: Option<f64>,
}

/// Fixed price list keyed by sku.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceListService {
    prices: BTreeMap<String, PriceListEntry>,
}

impl PriceListService {
    pub fn new(prices: BTreeMap<String, PriceListEntry>) -> Self {
        Self { prices }
    }

    pub fn from_prices<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        Self {
            prices: prices
                .into_iter()
                .map(|(sku, unit_price)| {
                    (sku.into(), PriceListEntry { unit_price, ..PriceListEntry::default() })
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PricingService for PriceListService {
    fn price(&self, request: &PricingRequest) -> Result<PricingResponse, ApplicationError> {
        let mut items = Vec::with_capacity(request.cart.len());
        for line in &request.cart {
            let entry = self.prices.get(&line.sku).ok_or_else(|| {
                ApplicationError::Pricing(format!("no list price for sku `{}`", line.sku))
            })?;
            items.push(PricedItem {
                sku: line.sku.clone(),
                sqft_sheet: line.sqft_sheet,
                unit_price: entry.unit_price,
                unit: entry.unit.clone(),
                product_weight: entry.product_weight,
                variant_code: None,
            });
        }

        Ok(PricingResponse { items, totals: BTreeMap::new() })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RepriceReport {
    pub strategy: TotalsStrategy,
    pub priced: usize,
    pub unmatched: usize,
    /// Totals were taken from the pricing service rather than recomputed.
    pub service_totals: bool,
}

/// Brings a draft's prices and totals up to date. Lines that already carry a
/// price are left alone; only unpriced session lines go to `service`. Totals the
/// service reports win over the local recompute.
pub fn reprice(
    store: &mut CartStore,
    service: &dyn PricingService,
    vat_rate: Decimal,
) -> Result<RepriceReport, ApplicationError> {
    let strategy = select_strategy(store.draft());
    let mut report = RepriceReport { strategy, priced: 0, unmatched: 0, service_totals: false };
    let mut service_totals = BTreeMap::new();

    if strategy == TotalsStrategy::RemotePricing {
        let request = PricingRequest::for_unpriced(store.draft());
        let response = service.price(&request)?;
        for item in response.items {
            match store.dispatch(CartAction::ApplyPricingResult(item)) {
                DispatchOutcome::Applied => report.priced += 1,
                _ => report.unmatched += 1,
            }
        }
        service_totals = response.totals;
    }

    let local = compute_local_totals(store.draft(), vat_rate);
    let totals = match totals_from_service(&service_totals) {
        // figures the service leaves out are filled in locally
        Some(remote) => {
            report.service_totals = true;
            TotalsPatch {
                ex_vat: remote.ex_vat.or(local.ex_vat),
                vat: remote.vat.or(local.vat),
                grand_total: remote.grand_total.or(local.grand_total),
                shipping_raw: remote.shipping_raw.or(local.shipping_raw),
                shipping_customer_pay: remote.shipping_customer_pay.or(local.shipping_customer_pay),
                extra: remote.extra,
            }
        }
        None => TotalsPatch { extra: service_totals, ..local },
    };
    store.dispatch(CartAction::SetTotals(totals));

    if report.unmatched > 0 {
        warn!(
            event_name = "pricing.reprice_partial",
            unmatched = report.unmatched,
            "some priced items did not match a cart line"
        );
    }
    info!(
        event_name = "pricing.repriced",
        strategy = ?report.strategy,
        priced = report.priced,
        service_totals = report.service_totals,
        grand_total = %store.draft().totals.grand_total,
        "draft totals updated"
    );

    Ok(report)
}
