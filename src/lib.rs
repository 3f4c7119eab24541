//! Child Benefit received and High Income Child Benefit Charge for UK tax years.

pub mod core;
