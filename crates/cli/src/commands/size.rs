use glassquote_core::config::{AppConfig, LoadOptions};
use glassquote_core::sizing::{AreaCalculator, AreaInput, LengthUnit};
use tracing::info;

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_INVALID_INPUT};

#[derive(Clone, Debug)]
pub struct SizeArgs {
    pub width: String,
    pub height: String,
    pub width_unit: String,
    pub height_unit: String,
    pub qty: u32,
    pub fixed: bool,
}

pub fn run(args: SizeArgs, options: LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("size", "config_validation", error.to_string(), EXIT_CONFIG)
        }
    };

    let (width_unit, height_unit) =
        match (args.width_unit.parse::<LengthUnit>(), args.height_unit.parse::<LengthUnit>()) {
            (Ok(width_unit), Ok(height_unit)) => (width_unit, height_unit),
            (Err(error), _) | (_, Err(error)) => {
                return CommandResult::failure(
                    "size",
                    "invalid_input",
                    error.to_string(),
                    EXIT_INVALID_INPUT,
                )
            }
        };

    let input = AreaInput {
        width: args.width,
        width_unit,
        height: args.height,
        height_unit,
        qty: args.qty.max(1),
    };
    let calculator = AreaCalculator::new(config.sizing.steps);
    let Some(area) = calculator.compute_input(&input, !args.fixed) else {
        return CommandResult::failure(
            "size",
            "invalid_input",
            "width and height must both be positive numbers",
            EXIT_INVALID_INPUT,
        );
    };

    info!(
        event_name = "cli.size_computed",
        width_rounded = area.width_rounded,
        height_rounded = area.height_rounded,
        actual_sqft = area.actual_sqft,
        "area computed"
    );

    let summary = format!(
        "{}x{} in -> {}x{} in, {:.3} sqft billable",
        area.width_raw, area.height_raw, area.width_rounded, area.height_rounded, area.actual_sqft
    );
    CommandResult::success_with("size", summary, Some(area))
}
