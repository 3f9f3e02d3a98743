use std::env;
use std::fs;
use std::path::Path;

use glassquote_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

struct Field<'a> {
    key: &'a str,
    value: String,
    env_keys: &'a [&'a str],
}

pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            )
        }
    };
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let steps = config
        .sizing
        .steps
        .steps()
        .iter()
        .map(|step| step.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let fields = [
        Field { key: "sizing.steps", value: steps, env_keys: &["GLASSQUOTE_SIZING_STEPS"] },
        Field {
            key: "pricing.vat_rate",
            value: config.pricing.vat_rate.to_string(),
            env_keys: &["GLASSQUOTE_PRICING_VAT_RATE"],
        },
        Field {
            key: "pricing.default_price_mode",
            value: config.pricing.default_price_mode.to_string(),
            env_keys: &["GLASSQUOTE_PRICING_DEFAULT_PRICE_MODE"],
        },
        Field {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["GLASSQUOTE_LOGGING_LEVEL", "GLASSQUOTE_LOG_LEVEL"],
        },
        Field {
            key: "logging.format",
            value: format!("{:?}", config.logging.format).to_ascii_lowercase(),
            env_keys: &["GLASSQUOTE_LOGGING_FORMAT", "GLASSQUOTE_LOG_FORMAT"],
        },
    ];

    let mut lines =
        vec!["effective config (source precedence: override > env > file > default):".to_string()];
    for field in &fields {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
