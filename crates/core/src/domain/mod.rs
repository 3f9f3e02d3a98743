pub mod catalog;
pub mod customer;
pub mod line;
pub mod quote;
