use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glassquote_core::cart::CartAction;
use glassquote_core::config::{AppConfig, LoadOptions};
use glassquote_core::domain::catalog::{Catalog, CatalogItem};
use glassquote_core::glass::{GlassLine, GlassLineBuilder, PriceMode};
use glassquote_core::sizing::{AreaCalculator, AreaInput, LengthUnit};
use serde::Serialize;
use tracing::info;

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_INVALID_INPUT};

#[derive(Clone, Debug)]
pub struct GlassArgs {
    pub catalog: PathBuf,
    pub sku: String,
    pub width: Option<String>,
    pub height: Option<String>,
    pub width_unit: String,
    pub height_unit: String,
    pub qty: u32,
    pub qty_sku: u32,
    pub variant_code: Option<String>,
    /// Falls back to `pricing.default_price_mode` when absent.
    pub price_mode: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GlassReport {
    line: GlassLine,
    /// Ready to append to a `cart --actions` file.
    action: CartAction,
}

pub fn run(args: GlassArgs, options: LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "glass",
                "config_validation",
                error.to_string(),
                EXIT_CONFIG,
            )
        }
    };

    match build_line(&args, &config) {
        Ok(line) => {
            info!(
                event_name = "cli.glass_line_built",
                sku = %line.sku,
                price_mode = %line.price_mode,
                billable_sqft = line.sqft,
                "glass line built"
            );
            let summary = format!("{} ({}): {:.3} sqft billable", line.name, line.sku, line.sqft);
            let action = CartAction::AddItem(line.clone().into_line_item());
            CommandResult::success_with("glass", summary, Some(GlassReport { line, action }))
        }
        Err(error) => CommandResult::failure(
            "glass",
            "invalid_input",
            format!("{error:#}"),
            EXIT_INVALID_INPUT,
        ),
    }
}

fn build_line(args: &GlassArgs, config: &AppConfig) -> Result<GlassLine> {
    let catalog = read_catalog(&args.catalog)?;
    let sku = args.sku.trim();
    let item = catalog
        .find(sku)
        .with_context(|| format!("sku `{sku}` is not in the catalog"))?;

    let price_mode = match args.price_mode.as_deref() {
        Some(raw) => raw.parse::<PriceMode>()?,
        None => config.pricing.default_price_mode,
    };

    let input = AreaInput {
        width: args.width.clone().unwrap_or_default(),
        width_unit: args.width_unit.parse::<LengthUnit>()?,
        height: args.height.clone().unwrap_or_default(),
        height_unit: args.height_unit.parse::<LengthUnit>()?,
        qty: args.qty.max(1),
    };
    let calculator = AreaCalculator::new(config.sizing.steps.clone());
    let sizing = if item.is_variant || input.is_ready() {
        calculator.compute(input.width_inches(), input.height_inches(), input.qty, item.is_variant)
    } else {
        // fixed sheets default to their catalog size
        let (width, height) = GlassLineBuilder::nominal_size(item);
        calculator.compute(width, height, input.qty, false)
    };

    let line = GlassLineBuilder.build(
        item,
        &sizing,
        args.qty_sku.max(1),
        args.variant_code.as_deref(),
        price_mode,
    )?;
    Ok(line)
}

fn read_catalog(path: &Path) -> Result<Catalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read catalog `{}`", path.display()))?;
    let items: Vec<CatalogItem> = serde_json::from_str(&raw)
        .with_context(|| format!("catalog `{}` must be a JSON array of items", path.display()))?;
    Ok(Catalog::new(items))
}
