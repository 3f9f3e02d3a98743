pub mod manual;
pub mod request;
pub mod rounding;
pub mod service;
pub mod totals;

pub use manual::{is_below_system_price, system_display_price, ManualPrice};
pub use request::{CustomerData, PricedItem, PricingLine, PricingRequest, PricingResponse};
pub use rounding::{round_money, round_price};
pub use service::{reprice, PriceListEntry, PriceListService, PricingService, RepriceReport};
pub use totals::{
    cart_subtotal, compute_local_totals, has_unpriced_lines, select_strategy, totals_from_service,
    TotalsStrategy, DEFAULT_VAT_RATE,
};
