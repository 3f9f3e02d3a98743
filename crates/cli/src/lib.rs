pub mod commands;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use glassquote_core::config::{AppConfig, LoadOptions, LogFormat};
use tracing_subscriber::EnvFilter;

use commands::cart::CartArgs;
use commands::glass::GlassArgs;
use commands::size::SizeArgs;

#[derive(Debug, Parser)]
#[command(
    name = "glassquote",
    about = "Glass quotation toolkit",
    long_about = "Size glass panes, build glass cart lines, round prices, and replay cart actions against a price list.",
    after_help = "Examples:\n  glassquote size --width 23.5 --height 48 --qty 2\n  glassquote glass --catalog catalog.json --sku G0101001010600000 --width 23.5 --height 47 --variant-code V1\n  glassquote round-price 12.3\n  glassquote cart --actions actions.json --prices prices.json\n  glassquote config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a glassquote.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compute rounded dimensions and billable area for a pane")]
    Size {
        #[arg(long, help = "Width in the given unit")]
        width: String,
        #[arg(long)]
        height: String,
        #[arg(long = "unit-w", default_value = "inch")]
        width_unit: String,
        #[arg(long = "unit-h", default_value = "inch")]
        height_unit: String,
        #[arg(long, default_value_t = 1)]
        qty: u32,
        #[arg(long, help = "Fixed-size glass: bill the raw area without step rounding")]
        fixed: bool,
    },
    #[command(about = "Build a confirmed glass cart line from a catalog entry and a cut size")]
    Glass {
        #[arg(long, help = "JSON array of catalog items")]
        catalog: PathBuf,
        #[arg(long)]
        sku: String,
        #[arg(long, help = "Cut width; fixed sheets default to their catalog size")]
        width: Option<String>,
        #[arg(long)]
        height: Option<String>,
        #[arg(long = "unit-w", default_value = "inch")]
        width_unit: String,
        #[arg(long = "unit-h", default_value = "inch")]
        height_unit: String,
        #[arg(long, default_value_t = 1, help = "Pieces the customer ordered")]
        qty: u32,
        #[arg(long, default_value_t = 1, help = "Catalog sheets consumed")]
        qty_sku: u32,
        #[arg(long)]
        variant_code: Option<String>,
        #[arg(long, help = "actual | by_sku; defaults to pricing.default_price_mode")]
        price_mode: Option<String>,
    },
    #[command(about = "Apply the customer-facing price rounding rule")]
    RoundPrice { value: String },
    #[command(about = "Replay a JSON array of cart actions and optionally reprice the result")]
    Cart {
        #[arg(long, help = "JSON file holding the cart actions to dispatch in order")]
        actions: PathBuf,
        #[arg(long, help = "JSON price list mapping sku to unit price")]
        prices: Option<PathBuf>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    let builder =
        tracing_subscriber::fmt().with_target(false).with_env_filter(filter).with_writer(io::stderr);

    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config.clone(),
        ..LoadOptions::default()
    };

    // Commands report config errors themselves; logging falls back to defaults.
    let logging_config = AppConfig::load(options.clone()).unwrap_or_default();
    init_logging(&logging_config);

    let result = match cli.command {
        Command::Size { width, height, width_unit, height_unit, qty, fixed } => commands::size::run(
            SizeArgs { width, height, width_unit, height_unit, qty, fixed },
            options,
        ),
        Command::Glass {
            catalog,
            sku,
            width,
            height,
            width_unit,
            height_unit,
            qty,
            qty_sku,
            variant_code,
            price_mode,
        } => commands::glass::run(
            GlassArgs {
                catalog,
                sku,
                width,
                height,
                width_unit,
                height_unit,
                qty,
                qty_sku,
                variant_code,
                price_mode,
            },
            options,
        ),
        Command::RoundPrice { value } => commands::round_price::run(&value),
        Command::Cart { actions, prices } => {
            commands::cart::run(CartArgs { actions, prices }, options)
        }
        Command::Config => commands::config::run(options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
