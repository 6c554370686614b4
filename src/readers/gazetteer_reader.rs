use crate::error::{ForecastError, Result};
use crate::models::{city::state_matches, CityRecord};
use crate::utils::constants::{DEFAULT_ROW_CAP, EXCLUDED_STATES, GAZETTEER_COLUMNS};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};
use validator::Validate;

/// The projected gazetteer columns; any of them may be blank in the source.
/// Numbers stay text until the row is known to be kept.
#[derive(Debug, Deserialize)]
struct GazetteerRow {
    city: Option<String>,
    state_name: Option<String>,
    lat: Option<String>,
    lng: Option<String>,
    population: Option<String>,
    timezone: Option<String>,
}

impl GazetteerRow {
    fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.state_name.is_none()
            && self.lat.is_none()
            && self.lng.is_none()
            && self.population.is_none()
            && self.timezone.is_none()
    }

    fn is_in_any_state(&self, states: &[String]) -> bool {
        self.state_name
            .as_deref()
            .is_some_and(|state| state_matches(state, states))
    }
}

pub struct GazetteerReader {
    row_cap: usize,
    excluded_states: Vec<String>,
}

impl GazetteerReader {
    pub fn new() -> Self {
        Self {
            row_cap: DEFAULT_ROW_CAP,
            excluded_states: EXCLUDED_STATES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_row_cap(mut self, row_cap: usize) -> Self {
        self.row_cap = row_cap;
        self
    }

    pub fn with_excluded_states(mut self, excluded_states: Vec<String>) -> Self {
        self.excluded_states = excluded_states;
        self
    }

    /// Read the first `row_cap` gazetteer rows, drop blank rows and rows from
    /// excluded states.
    pub fn read_cities(&self, path: &Path) -> Result<Vec<CityRecord>> {
        let file = File::open(path)
            .map_err(|e| ForecastError::data_load(path, format!("cannot open file: {}", e)))?;
        let cities = self.read_cities_from(file, path)?;

        info!(
            "Loaded {} cities from {} (row cap {})",
            cities.len(),
            path.display(),
            self.row_cap
        );
        Ok(cities)
    }

    fn read_cities_from<R: Read>(&self, source: R, path: &Path) -> Result<Vec<CityRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);

        let headers = reader
            .headers()
            .map_err(|e| ForecastError::data_load(path, e.to_string()))?
            .clone();
        let missing: Vec<&str> = GAZETTEER_COLUMNS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            return Err(ForecastError::data_load(
                path,
                format!("missing required columns: {}", missing.join(", ")),
            ));
        }

        let mut cities = Vec::new();
        let mut excluded = 0usize;

        for (index, result) in reader
            .deserialize::<GazetteerRow>()
            .take(self.row_cap)
            .enumerate()
        {
            // header is line 1
            let line = index + 2;
            let row = result.map_err(|e| ForecastError::data_load(path, e.to_string()))?;

            if row.is_empty() {
                debug!("Skipping empty gazetteer row at line {}", line);
                continue;
            }

            if row.is_in_any_state(&self.excluded_states) {
                excluded += 1;
                continue;
            }
            cities.push(self.to_city_record(row, line, path)?);
        }

        debug!("Excluded {} cities outside forecast coverage", excluded);
        Ok(cities)
    }

    fn to_city_record(&self, row: GazetteerRow, line: usize, path: &Path) -> Result<CityRecord> {
        let missing = |column: &str| {
            ForecastError::data_load(path, format!("line {}: missing value for '{}'", line, column))
        };

        let number = |column: &str, value: Option<String>| -> Result<Option<f64>> {
            value
                .map(|v| {
                    v.parse::<f64>().map_err(|_| {
                        ForecastError::data_load(
                            path,
                            format!("line {}: invalid {} '{}'", line, column, v),
                        )
                    })
                })
                .transpose()
        };

        let lat = number("lat", row.lat)?.ok_or_else(|| missing("lat"))?;
        let lng = number("lng", row.lng)?.ok_or_else(|| missing("lng"))?;

        let population = match number("population", row.population)? {
            Some(p) if p < 0.0 || !p.is_finite() => {
                return Err(ForecastError::data_load(
                    path,
                    format!("line {}: invalid population {}", line, p),
                ))
            }
            Some(p) => Some(p.round() as u64),
            None => None,
        };

        let city = CityRecord::new(
            row.city.ok_or_else(|| missing("city"))?,
            row.state_name.unwrap_or_default(),
            lat,
            lng,
            population,
            row.timezone.unwrap_or_default(),
        );

        city.validate()
            .map_err(|e| ForecastError::data_load(path, format!("line {}: {}", line, e)))?;
        Ok(city)
    }
}

impl Default for GazetteerReader {
    fn default() -> Self {
        Self::new()
    }
}
