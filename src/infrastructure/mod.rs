pub mod persistence;
pub mod reporting;
pub mod sales_csv;
pub mod synthetic;
