//! Lenient numeric coercion for values that arrive from interactive input.
//!
//! Dimensions and quantities are typed by hand while a quote is being built, so
//! intermediate values are often empty or half-typed. Everything here degrades to
//! zero instead of failing.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Parses a number from user text. Empty, non-numeric and non-finite input yields 0.
pub fn parse_lenient(raw: &str) -> f64 {
    raw.trim().parse::<f64>().map(finite_or_zero).unwrap_or(0.0)
}

pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

pub fn decimal_from_f64(value: f64) -> Decimal {
    Decimal::from_f64(finite_or_zero(value)).unwrap_or(Decimal::ZERO)
}

pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Clamps a requested quantity into the valid line range `1..=u32::MAX`.
pub fn clamp_qty(requested: i64) -> u32 {
    u32::try_from(requested.max(1)).unwrap_or(u32::MAX)
}
