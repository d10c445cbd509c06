use crate::domain::errors::{PricingError, PricingResult};
use crate::domain::sales::{SALES_COLUMNS, SalesRecord};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

/// Reads sales records from CSV. The leading columns must be `date,price,units_sold` in that
/// order; trailing extra columns are ignored.
pub fn read_sales<R: Read>(reader: R) -> PricingResult<Vec<SalesRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let found: Vec<&str> = headers.iter().map(str::trim).collect();

    if found.len() < SALES_COLUMNS.len() || found[..SALES_COLUMNS.len()] != *SALES_COLUMNS {
        return Err(PricingError::Schema {
            expected: SALES_COLUMNS.join(","),
            found: found.join(","),
        });
    }

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: SalesRecord = result?;
        records.push(record);
    }
    Ok(records)
}

pub fn load_sales(path: &Path) -> PricingResult<Vec<SalesRecord>> {
    let file = File::open(path)?;
    let records = read_sales(BufReader::new(file))?;
    info!("Loaded {} sales records from {:?}", records.len(), path);
    Ok(records)
}

pub fn save_sales(path: &Path, records: &[SalesRecord]) -> PricingResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    info!("Wrote {} sales records to {:?}", records.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_read_valid_csv() {
        let data = "date,price,units_sold\n2022-01-01,99.5,80\n2022-01-02,120.25,41\n";
        let records = read_sales(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            SalesRecord::new(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(), 99.5, 80)
        );
        assert_eq!(records[1].units_sold, 41);
    }

    #[test]
    fn test_extra_trailing_columns_ignored() {
        let data = "date,price,units_sold,store\n2022-01-01,99.5,80,north\n";
        let records = read_sales(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_reordered_columns_rejected() {
        let data = "price,date,units_sold\n99.5,2022-01-01,80\n";
        assert!(matches!(
            read_sales(data.as_bytes()),
            Err(PricingError::Schema { .. })
        ));
    }

    #[test]
    fn test_missing_column_rejected() {
        let data = "date,price\n2022-01-01,99.5\n";
        assert!(matches!(
            read_sales(data.as_bytes()),
            Err(PricingError::Schema { .. })
        ));
    }

    #[test]
    fn test_negative_units_rejected() {
        let data = "date,price,units_sold\n2022-01-01,99.5,-3\n";
        assert!(matches!(
            read_sales(data.as_bytes()),
            Err(PricingError::Csv(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("sales.csv");
        let records = vec![
            SalesRecord::new(NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(), 87.125, 102),
            SalesRecord::new(NaiveDate::from_ymd_opt(2023, 3, 2).unwrap(), 112.0, 55),
        ];

        save_sales(&path, &records).unwrap();
        assert_eq!(load_sales(&path).unwrap(), records);
    }
}
