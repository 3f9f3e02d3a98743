use serde::{Deserialize, Serialize};

use crate::numeric::finite_or_zero;
use crate::sizing::steps::StepTable;
use crate::sizing::units::{to_inches_text, LengthUnit};

pub const SQ_INCHES_PER_SQFT: f64 = 144.0;

/// Dimensions as typed by the user, before conversion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaInput {
    pub width: String,
    pub width_unit: LengthUnit,
    pub height: String,
    pub height_unit: LengthUnit,
    pub qty: u32,
}

impl AreaInput {
    pub fn width_inches(&self) -> f64 {
        to_inches_text(&self.width, self.width_unit)
    }

    pub fn height_inches(&self) -> f64 {
        to_inches_text(&self.height, self.height_unit)
    }

    /// Both dimensions must be present before area is calculated.
    pub fn is_ready(&self) -> bool {
        self.width_inches() > 0.0 && self.height_inches() > 0.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaResult {
    pub width_raw: f64,
    pub height_raw: f64,
    pub width_rounded: f64,
    pub height_rounded: f64,
    pub sqft_raw: f64,
    pub sqft_rounded: f64,
    /// Pieces the customer ordered; `actual_sqft` covers all of them.
    pub qty: u32,
    pub actual_sqft: f64,
}

#[derive(Clone, Debug, Default)]
pub struct AreaCalculator {
    steps: StepTable,
}

impl AreaCalculator {
    pub fn new(steps: StepTable) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &StepTable {
        &self.steps
    }

    pub fn compute(&self, width_in: f64, height_in: f64, qty: u32, is_variant: bool) -> AreaResult {
        let width_raw = finite_or_zero(width_in);
        let height_raw = finite_or_zero(height_in);

        let (width_rounded, height_rounded) = if is_variant {
            (self.steps.round_to_step(width_raw), self.steps.round_to_step(height_raw))
        } else {
            // fixed catalog sizes are already sellable sizes
            (width_raw, height_raw)
        };

        let sqft_raw = width_raw * height_raw / SQ_INCHES_PER_SQFT;
        let sqft_rounded = width_rounded * height_rounded / SQ_INCHES_PER_SQFT;

        AreaResult {
            width_raw,
            height_raw,
            width_rounded,
            height_rounded,
            sqft_raw,
            sqft_rounded,
            qty,
            actual_sqft: sqft_rounded * f64::from(qty),
        }
    }

    /// Returns `None` while either typed dimension is still empty or zero.
    pub fn compute_input(&self, input: &AreaInput, is_variant: bool) -> Option<AreaResult> {
        if !input.is_ready() {
            return None;
        }

        Some(self.compute(input.width_inches(), input.height_inches(), input.qty, is_variant))
    }
}

pub fn compute_area(width_in: f64, height_in: f64, qty: u32, is_variant: bool) -> AreaResult {
    AreaCalculator::default().compute(width_in, height_in, qty, is_variant)
}

#[cfg(test)]
mod tests {
    use super::{compute_area, AreaCalculator, AreaInput};
    use crate::sizing::units::LengthUnit;

    #[test]
    fn variant_cut_rounds_both_dimensions_up() {
        let area = compute_area(13.0, 20.0, 2, true);

        assert_eq!(area.width_rounded, 18.0);
        assert_eq!(area.height_rounded, 24.0);
        assert!((area.sqft_raw - 13.0 * 20.0 / 144.0).abs() < 1e-12);
        assert!((area.sqft_raw - 1.806).abs() < 1e-3);
        assert_eq!(area.sqft_rounded, 3.0);
        assert_eq!(area.actual_sqft, 6.0);
    }

    #[test]
    fn fixed_catalog_size_is_not_rounded() {
        let area = compute_area(40.0, 60.0, 3, false);

        assert_eq!(area.width_rounded, 40.0);
        assert_eq!(area.height_rounded, 60.0);
        assert_eq!(area.sqft_raw, area.sqft_rounded);
        assert!((area.actual_sqft - 50.0).abs() < 1e-12);
    }

    #[test]
    fn zero_dimension_does_not_panic() {
        let area = compute_area(0.0, 24.0, 1, true);
        assert_eq!(area.width_rounded, 0.0);
        assert_eq!(area.sqft_rounded, 0.0);
        assert_eq!(area.actual_sqft, 0.0);
    }

    #[test]
    fn typed_input_is_gated_until_both_dimensions_exist() {
        let calculator = AreaCalculator::default();
        let mut input = AreaInput {
            width: "33".to_owned(),
            width_unit: LengthUnit::Cm,
            height: String::new(),
            height_unit: LengthUnit::Inch,
            qty: 1,
        };
        assert!(calculator.compute_input(&input, true).is_none());

        input.height = "2".to_owned();
        input.height_unit = LengthUnit::Ft;
        let area = calculator.compute_input(&input, true).expect("both dimensions typed");

        assert!((area.width_raw - 33.0 / 2.54).abs() < 1e-12);
        assert_eq!(area.width_rounded, 18.0);
        assert_eq!(area.height_raw, 24.0);
        assert_eq!(area.height_rounded, 24.0);
    }
}
