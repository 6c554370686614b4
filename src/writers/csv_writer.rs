use crate::error::{ForecastError, Result};
use crate::models::ForecastRow;
use std::fs;
use std::path::Path;
use tracing::info;

/// Output columns, in order.
pub const OUTPUT_COLUMNS: [&str; 14] = [
    "city",
    "state_name",
    "lat",
    "lng",
    "population",
    "timezone",
    "validTime",
    "temp",
    "chance_rain",
    "snow_amt",
    "wind_dir",
    "wind_spd",
    "vis",
    "rel_humid",
];

pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write the table with a header row; missing measurements are empty cells.
    pub fn write_rows(&self, rows: &[ForecastRow], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ForecastError::write(path, e))?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|e| ForecastError::write(path, e))?;

        writer
            .write_record(OUTPUT_COLUMNS)
            .map_err(|e| ForecastError::write(path, e))?;
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| ForecastError::write(path, e))?;
        }
        writer.flush().map_err(|e| ForecastError::write(path, e))?;

        info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}
