pub mod action;
pub mod store;

pub use action::{CartAction, DispatchOutcome, QtyTarget};
pub use store::{reduce, CartStore, SUMMARY_STEP};
