pub mod ml;
pub mod pricing;
