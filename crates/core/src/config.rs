use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::glass::builder::PriceMode;
use crate::pricing::totals::DEFAULT_VAT_RATE;
use crate::sizing::steps::StepTable;

pub const CONFIG_FILE_NAME: &str = "glassquote.toml";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub sizing: SizingConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SizingConfig {
    pub steps: StepTable,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PricingConfig {
    pub vat_rate: Decimal,
    pub default_price_mode: PriceMode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub steps: Option<Vec<f64>>,
    pub vat_rate: Option<Decimal>,
    pub default_price_mode: Option<PriceMode>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sizing: SizingConfig::default(),
            pricing: PricingConfig {
                vat_rate: DEFAULT_VAT_RATE,
                default_price_mode: PriceMode::Actual,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides)?;
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(sizing) = patch.sizing {
            if let Some(steps) = sizing.steps {
                self.sizing.steps = step_table(steps)?;
            }
        }

        if let Some(pricing) = patch.pricing {
            if let Some(vat_rate) = pricing.vat_rate {
                self.pricing.vat_rate = vat_rate;
            }
            if let Some(default_price_mode) = pricing.default_price_mode {
                self.pricing.default_price_mode = default_price_mode;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("GLASSQUOTE_SIZING_STEPS") {
            let steps = parse_steps("GLASSQUOTE_SIZING_STEPS", &value)?;
            self.sizing.steps = step_table(steps)?;
        }

        if let Some(value) = read_env("GLASSQUOTE_PRICING_VAT_RATE") {
            self.pricing.vat_rate = parse_decimal("GLASSQUOTE_PRICING_VAT_RATE", &value)?;
        }
        if let Some(value) = read_env("GLASSQUOTE_PRICING_DEFAULT_PRICE_MODE") {
            self.pricing.default_price_mode =
                value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "GLASSQUOTE_PRICING_DEFAULT_PRICE_MODE".to_string(),
                    value: value.clone(),
                })?;
        }

        let log_level =
            read_env("GLASSQUOTE_LOGGING_LEVEL").or_else(|| read_env("GLASSQUOTE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("GLASSQUOTE_LOGGING_FORMAT").or_else(|| read_env("GLASSQUOTE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(steps) = overrides.steps {
            self.sizing.steps = step_table(steps)?;
        }
        if let Some(vat_rate) = overrides.vat_rate {
            self.pricing.vat_rate = vat_rate;
        }
        if let Some(default_price_mode) = overrides.default_price_mode {
            self.pricing.default_price_mode = default_price_mode;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pricing(&self.pricing)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Config file used when no explicit path is given, if one exists.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(CONFIG_FILE_NAME), Path::new("config").join(CONFIG_FILE_NAME)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn step_table(steps: Vec<f64>) -> Result<StepTable, ConfigError> {
    StepTable::new(steps).map_err(|error| ConfigError::Validation(format!("sizing.steps: {error}")))
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    if pricing.vat_rate < Decimal::ZERO || pricing.vat_rate >= Decimal::ONE {
        return Err(ConfigError::Validation(
            "pricing.vat_rate must be a fraction in range 0 <= rate < 1 (e.g. 0.07)".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_steps(key: &str, value: &str) -> Result<Vec<f64>, ConfigError> {
    value
        .split(',')
        .map(|step| {
            step.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
                key: key.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    sizing: Option<SizingPatch>,
    pricing: Option<PricingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SizingPatch {
    steps: Option<Vec<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    vat_rate: Option<Decimal>,
    default_price_mode: Option<PriceMode>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
