pub mod area;
pub mod steps;
pub mod units;

pub use area::{compute_area, AreaCalculator, AreaInput, AreaResult, SQ_INCHES_PER_SQFT};
pub use steps::{round_to_step, StepTable, DEFAULT_STEPS};
pub use units::{to_inches, to_inches_text, LengthUnit};
