use crate::error::{ForecastError, Result};
use crate::models::{CityRecord, ForecastFile, ForecastRow};
use std::path::Path;

/// Turns decoder output into forecast rows for one (grid, city) pair.
pub struct RowBuilder;

impl RowBuilder {
    pub fn new() -> Self {
        Self
    }

    /// One row per data line. The first line is the decoder's header; the
    /// second-to-last field is `validTime` and the last field is the value of
    /// the grid's channel.
    pub fn build_rows(
        &self,
        output: &str,
        file: &ForecastFile,
        grid_path: &Path,
        city: &CityRecord,
    ) -> Result<Vec<ForecastRow>> {
        let mut rows = Vec::new();

        for (index, line) in output.trim().lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() < 2 {
                return Err(ForecastError::decode(
                    grid_path,
                    city.lat,
                    city.lng,
                    format!("line {}: expected '<validTime>,<value>', got '{}'", index + 1, line),
                ));
            }

            let valid_time = fields[fields.len() - 2].trim();
            let value = fields[fields.len() - 1].trim();
            rows.push(ForecastRow::from_measurement(city, valid_time, file.channel, value));
        }

        Ok(rows)
    }
}

impl Default for RowBuilder {
    fn default() -> Self {
        Self::new()
    }
}
