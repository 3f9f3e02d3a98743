use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glassquote_core::audit::{AuditContext, AuditEvent, InMemoryAuditSink};
use glassquote_core::cart::{CartAction, CartStore, DispatchOutcome};
use glassquote_core::config::{AppConfig, LoadOptions};
use glassquote_core::domain::quote::QuoteDraft;
use glassquote_core::errors::ApplicationError;
use glassquote_core::pricing::{reprice, PriceListService, RepriceReport};
use serde::Serialize;
use tracing::info;

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_INVALID_INPUT, EXIT_PRICING};

#[derive(Clone, Debug)]
pub struct CartArgs {
    pub actions: PathBuf,
    pub prices: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ActionReport {
    index: usize,
    action: &'static str,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct CartReport {
    actions: Vec<ActionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reprice: Option<RepriceReport>,
    draft: QuoteDraft,
    audit: Vec<AuditEvent>,
}

pub fn run(args: CartArgs, options: LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("cart", "config_validation", error.to_string(), EXIT_CONFIG)
        }
    };

    let actions = match read_actions(&args.actions) {
        Ok(actions) => actions,
        Err(error) => {
            return CommandResult::failure(
                "cart",
                "invalid_input",
                format!("{error:#}"),
                EXIT_INVALID_INPUT,
            )
        }
    };
    let price_list = match args.prices.as_deref().map(read_price_list).transpose() {
        Ok(price_list) => price_list,
        Err(error) => {
            return CommandResult::failure(
                "cart",
                "invalid_input",
                format!("{error:#}"),
                EXIT_INVALID_INPUT,
            )
        }
    };

    let mut store = CartStore::default();
    let sink = InMemoryAuditSink::default();
    let audit = AuditContext::new(None, None, args.actions.display().to_string(), "cli");
    let mut reports = Vec::with_capacity(actions.len());
    for (index, action) in actions.into_iter().enumerate() {
        let name = action.name();
        let outcome = store.dispatch_with_audit(action, &sink, &audit);
        let error = match &outcome {
            DispatchOutcome::Rejected(error) => Some(error.to_string()),
            _ => None,
        };
        reports.push(ActionReport { index, action: name, outcome: outcome.label(), error });
    }

    let repriced = match price_list {
        Some(service) => match reprice(&mut store, &service, config.pricing.vat_rate) {
            Ok(report) => Some(report),
            Err(error) => return pricing_failure(error),
        },
        None => None,
    };

    let draft = store.into_draft();
    info!(
        event_name = "cli.cart_replayed",
        actions = reports.len(),
        lines = draft.cart.len(),
        grand_total = %draft.totals.grand_total,
        "cart replay finished"
    );

    let summary = format!(
        "replayed {} actions: {} lines, grand total {}",
        reports.len(),
        draft.cart.len(),
        draft.totals.grand_total
    );
    CommandResult::success_with(
        "cart",
        summary,
        Some(CartReport { actions: reports, reprice: repriced, draft, audit: sink.events() }),
    )
}

fn pricing_failure(error: ApplicationError) -> CommandResult {
    let interface = error.into_interface("cli");
    CommandResult::failure(
        "cart",
        "pricing",
        format!("{} ({interface})", interface.user_message()),
        EXIT_PRICING,
    )
}

fn read_actions(path: &Path) -> Result<Vec<CartAction>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read actions file `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("actions file `{}` is not a JSON array of cart actions", path.display()))
}

fn read_price_list(path: &Path) -> Result<PriceListService> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read price list `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("price list `{}` must map skus to prices", path.display()))
}
