pub mod builder;
pub mod sku;

pub use builder::{GlassLine, GlassLineBuilder, PriceMode};
pub use sku::{size_from_sku, thickness_from_sku, GlassSku};
