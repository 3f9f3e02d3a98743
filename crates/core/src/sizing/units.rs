use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::numeric::{finite_or_zero, parse_lenient};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    #[default]
    Inch,
    Cm,
    Mm,
    Ft,
}

impl LengthUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inch => "inch",
            Self::Cm => "cm",
            Self::Mm => "mm",
            Self::Ft => "ft",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthUnit {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inch" | "in" | "inches" => Ok(Self::Inch),
            "cm" => Ok(Self::Cm),
            "mm" => Ok(Self::Mm),
            "ft" | "feet" => Ok(Self::Ft),
            other => Err(DomainError::InvariantViolation(format!(
                "unsupported length unit `{other}` (expected inch|cm|mm|ft)"
            ))),
        }
    }
}

pub fn to_inches(value: f64, unit: LengthUnit) -> f64 {
    let value = finite_or_zero(value);
    if value == 0.0 {
        return 0.0;
    }

    match unit {
        LengthUnit::Inch => value,
        LengthUnit::Cm => value / 2.54,
        LengthUnit::Mm => value / 25.4,
        LengthUnit::Ft => value * 12.0,
    }
}

/// Converts a typed dimension; text that is not a number counts as 0.
pub fn to_inches_text(raw: &str, unit: LengthUnit) -> f64 {
    to_inches(parse_lenient(raw), unit)
}
