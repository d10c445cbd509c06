pub mod optimizer;
pub mod service;
