use crate::error::{ForecastError, Result};
use crate::models::ForecastRow;
use std::path::Path;

/// Reads a forecast table previously written by `CsvWriter`.
pub struct ForecastTableReader;

impl ForecastTableReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_rows(&self, path: &Path) -> Result<Vec<ForecastRow>> {
        if !path.exists() {
            return Err(ForecastError::InvalidFormat(format!(
                "Forecast table not found: {}",
                path.display()
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let rows = reader
            .deserialize::<ForecastRow>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl Default for ForecastTableReader {
    fn default() -> Self {
        Self::new()
    }
}
