pub mod audit;
pub mod cart;
pub mod config;
pub mod domain;
pub mod errors;
pub mod glass;
pub mod identity;
pub mod numeric;
pub mod pricing;
pub mod sizing;

pub use audit::{
    AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink,
};
pub use cart::{reduce, CartAction, CartStore, DispatchOutcome, QtyTarget};
pub use domain::catalog::{Catalog, CatalogItem};
pub use domain::customer::{CategorySales, CustomerRef};
pub use domain::line::{Category, GlassDimensions, LineItem, LineSource, PriceSource};
pub use domain::quote::{
    DeliveryType, DraftRecord, QuoteDraft, QuoteStatus, ShippingInfo, ShippingPatch, Totals,
    TotalsPatch,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use glass::{GlassLine, GlassLineBuilder, GlassSku, PriceMode};
pub use identity::{pricing_key_of, ui_key_of, PricingKey, RemovalTarget, UiKey};
pub use pricing::{
    compute_local_totals, reprice, round_price, ManualPrice, PriceListService, PricedItem,
    PricingRequest, PricingResponse, PricingService, TotalsStrategy,
};
pub use sizing::{
    compute_area, round_to_step, to_inches, AreaCalculator, AreaResult, LengthUnit, StepTable,
};
