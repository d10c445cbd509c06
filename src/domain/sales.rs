use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column names of the historical sales input, in order.
pub const SALES_COLUMNS: &[&str] = &["date", "price", "units_sold"];

/// One day of historical sales for the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub price: f64,
    pub units_sold: u32,
}

impl SalesRecord {
    pub fn new(date: NaiveDate, price: f64, units_sold: u32) -> Self {
        Self {
            date,
            price,
            units_sold,
        }
    }
}
