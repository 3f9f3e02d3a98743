use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Standard sellable sheet dimensions in inches. Existing quoted prices depend on
/// these exact breakpoints.
pub const DEFAULT_STEPS: [f64; 13] =
    [12.0, 18.0, 24.0, 30.0, 36.0, 42.0, 48.0, 60.0, 72.0, 84.0, 96.0, 120.0, 144.0];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct StepTable {
    steps: Vec<f64>,
}

impl Default for StepTable {
    fn default() -> Self {
        Self { steps: DEFAULT_STEPS.to_vec() }
    }
}

impl StepTable {
    pub fn new(steps: Vec<f64>) -> Result<Self, DomainError> {
        if steps.is_empty() {
            return Err(DomainError::InvalidStepTable("at least one step is required".to_owned()));
        }
        if steps.iter().any(|step| !step.is_finite() || *step <= 0.0) {
            return Err(DomainError::InvalidStepTable(
                "steps must be positive finite numbers".to_owned(),
            ));
        }
        if steps.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(DomainError::InvalidStepTable(
                "steps must be strictly ascending".to_owned(),
            ));
        }

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[f64] {
        &self.steps
    }

    pub fn largest(&self) -> f64 {
        self.steps.last().copied().unwrap_or(0.0)
    }

    /// Smallest step at or above `inches`. Values past the largest step pass through.
    pub fn round_to_step(&self, inches: f64) -> f64 {
        if inches.is_nan() || inches <= 0.0 {
            return 0.0;
        }
        if inches > self.largest() {
            return inches;
        }

        self.steps.iter().copied().find(|step| inches <= *step).unwrap_or(inches)
    }
}

impl TryFrom<Vec<f64>> for StepTable {
    type Error = DomainError;

    fn try_from(steps: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(steps)
    }
}

impl From<StepTable> for Vec<f64> {
    fn from(table: StepTable) -> Self {
        table.steps
    }
}

pub fn round_to_step(inches: f64) -> f64 {
    StepTable::default().round_to_step(inches)
}
