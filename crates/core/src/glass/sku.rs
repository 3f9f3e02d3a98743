use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

const GLASS_SKU_LEN: usize = 18;

/// Structured glass sku: `G` + brand(2) + type(2) + sub type(3) + color(2) +
/// thickness mm(2) + width in(3) + length in(3), e.g. `G01010010106024060`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlassSku {
    pub brand: u8,
    pub kind: u8,
    pub sub_type: u16,
    pub color: u8,
    pub thickness_mm: u8,
    pub width_in: u16,
    pub length_in: u16,
}

impl GlassSku {
    pub fn parse(sku: &str) -> Option<Self> {
        let sku = sku.trim();
        if sku.len() != GLASS_SKU_LEN || !sku.starts_with('G') {
            return None;
        }
        let digits = &sku[1..];
        if !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }

        Some(Self {
            brand: digits[0..2].parse().ok()?,
            kind: digits[2..4].parse().ok()?,
            sub_type: digits[4..7].parse().ok()?,
            color: digits[7..9].parse().ok()?,
            thickness_mm: digits[9..11].parse().ok()?,
            width_in: digits[11..14].parse().ok()?,
            length_in: digits[14..17].parse().ok()?,
        })
    }

    /// Builds a sku from a size in inches; sizes are rounded to whole inches.
    pub fn build(
        brand: u8,
        kind: u8,
        sub_type: u16,
        color: u8,
        thickness_mm: u8,
        width_in: f64,
        length_in: f64,
    ) -> Self {
        Self {
            brand,
            kind,
            sub_type,
            color,
            thickness_mm,
            width_in: whole_inches(width_in),
            length_in: whole_inches(length_in),
        }
    }

    pub fn nominal_sqft(&self) -> f64 {
        f64::from(self.width_in) * f64::from(self.length_in) / 144.0
    }
}

fn whole_inches(value: f64) -> u16 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round().min(999.0) as u16
}

impl fmt::Display for GlassSku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "G{:02}{:02}{:03}{:02}{:02}{:03}{:03}",
            self.brand,
            self.kind,
            self.sub_type,
            self.color,
            self.thickness_mm,
            self.width_in,
            self.length_in
        )
    }
}

impl FromStr for GlassSku {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw).ok_or_else(|| DomainError::InvalidLineKey(raw.to_owned()))
    }
}

pub fn thickness_from_sku(sku: &str) -> Option<u8> {
    let code = sku.get(10..12)?;
    if code.bytes().all(|byte| byte.is_ascii_digit()) {
        code.parse().ok()
    } else {
        None
    }
}

/// Nominal (width, length) in inches from the trailing six digits of a sku.
pub fn size_from_sku(sku: &str) -> Option<(f64, f64)> {
    let start = sku.len().checked_sub(6)?;
    let tail = sku.get(start..)?;
    if !tail.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    let width: u16 = tail[..3].parse().ok()?;
    let length: u16 = tail[3..].parse().ok()?;
    Some((f64::from(width), f64::from(length)))
}
