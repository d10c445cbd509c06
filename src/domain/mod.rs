pub mod errors;
pub mod ml;
pub mod ports;
pub mod pricing;
pub mod sales;
