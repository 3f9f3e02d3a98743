//! Line identity keys.
//!
//! Two keys exist on purpose. [`UiKey`] (sku + variant + sqft) decides whether two
//! rows are the same pick and drives merge, selection and removal. [`PricingKey`]
//! (sku + sqft) is what the pricing service echoes back, so it is the only key a
//! priced result can be re-attached by. Two variants of one sku and size share a
//! pricing key and therefore receive the same price.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::line::LineItem;
use crate::errors::DomainError;
use crate::numeric::{finite_or_zero, parse_lenient};
use crate::pricing::request::PricedItem;

const SEPARATOR: &str = "__";

pub fn normalize_variant(variant_code: Option<&str>) -> Option<String> {
    variant_code.map(str::trim).filter(|code| !code.is_empty()).map(str::to_owned)
}

fn normalize_sku(sku: String) -> String {
    sku.trim().to_owned()
}

pub fn normalize_sqft(sqft: f64) -> f64 {
    let sqft = finite_or_zero(sqft);
    // collapse -0.0 so keys render identically
    if sqft == 0.0 {
        0.0
    } else {
        sqft
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiKey {
    pub sku: String,
    pub variant_code: Option<String>,
    pub sqft: f64,
}

impl UiKey {
    pub fn new(sku: impl Into<String>, variant_code: Option<&str>, sqft: f64) -> Self {
        Self {
            sku: normalize_sku(sku.into()),
            variant_code: normalize_variant(variant_code),
            sqft: normalize_sqft(sqft),
        }
    }

    pub fn matches(&self, line: &LineItem) -> bool {
        ui_key_of(line) == *self
    }

    pub fn pricing_key(&self) -> PricingKey {
        PricingKey::new(self.sku.clone(), self.sqft)
    }
}

impl fmt::Display for UiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.sku,
            self.variant_code.as_deref().unwrap_or_default(),
            self.sqft
        )
    }
}

impl FromStr for UiKey {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.rsplitn(3, SEPARATOR);
        let (Some(sqft), Some(variant), Some(sku)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(DomainError::InvalidLineKey(raw.to_owned()));
        };
        if sku.is_empty() {
            return Err(DomainError::InvalidLineKey(raw.to_owned()));
        }

        Ok(Self::new(sku, Some(variant), parse_lenient(sqft)))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingKey {
    pub sku: String,
    pub sqft: f64,
}

impl PricingKey {
    pub fn new(sku: impl Into<String>, sqft: f64) -> Self {
        Self { sku: normalize_sku(sku.into()), sqft: normalize_sqft(sqft) }
    }

    pub fn of_priced(item: &PricedItem) -> Self {
        Self::new(item.sku.clone(), item.sqft_sheet)
    }

    pub fn matches(&self, line: &LineItem) -> bool {
        pricing_key_of(line) == *self
    }
}

impl fmt::Display for PricingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.sku, self.sqft)
    }
}

pub fn ui_key_of(line: &LineItem) -> UiKey {
    UiKey::new(line.sku.clone(), line.variant_code.as_deref(), line.sqft_sheet)
}

pub fn pricing_key_of(line: &LineItem) -> PricingKey {
    PricingKey::new(line.sku.clone(), line.sqft_sheet)
}

/// What a removal request points at. Older callers still send the coarse
/// `sku__sqft` form or a bare sku.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "by", content = "key", rename_all = "snake_case")]
pub enum RemovalTarget {
    Line(UiKey),
    Pricing(PricingKey),
    Sku(String),
}

impl RemovalTarget {
    pub fn matches(&self, line: &LineItem) -> bool {
        match self {
            Self::Line(key) => key.matches(line),
            Self::Pricing(key) => key.matches(line),
            Self::Sku(sku) => line.sku == sku.trim(),
        }
    }
}

impl FromStr for RemovalTarget {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.matches(SEPARATOR).count() {
            0 if !raw.trim().is_empty() => Ok(Self::Sku(raw.trim().to_owned())),
            1 => {
                let (sku, sqft) = raw
                    .split_once(SEPARATOR)
                    .ok_or_else(|| DomainError::InvalidLineKey(raw.to_owned()))?;
                Ok(Self::Pricing(PricingKey::new(sku, parse_lenient(sqft))))
            }
            0 => Err(DomainError::InvalidLineKey(raw.to_owned())),
            _ => raw.parse().map(Self::Line),
        }
    }
}
