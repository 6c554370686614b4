use crate::error::{ForecastError, Result};
use crate::models::{Channel, ForecastRow};
use crate::readers::ForecastTableReader;
use crate::utils::constants::LOOKUP_COLUMN_WIDTH;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

const VALID_TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Forecast rows grouped by `"<city>,<state_name>"`.
#[derive(Debug, Default)]
pub struct ForecastIndex {
    forecasts: HashMap<String, Vec<ForecastRow>>,
}

impl ForecastIndex {
    pub fn from_rows(rows: Vec<ForecastRow>) -> Self {
        let mut forecasts: HashMap<String, Vec<ForecastRow>> = HashMap::new();
        for row in rows {
            forecasts.entry(row.key()).or_default().push(row);
        }
        Self { forecasts }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let rows = ForecastTableReader::new().read_rows(path)?;
        Ok(Self::from_rows(rows))
    }

    pub fn len(&self) -> usize {
        self.forecasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty()
    }

    /// Rows for a `city,state` key as typed at the prompt.
    pub fn get(&self, key: &str) -> Option<&[ForecastRow]> {
        let (city, state) = key.split_once(',')?;
        self.forecasts
            .get(&format!("{},{}", city.trim(), state.trim()))
            .map(Vec::as_slice)
    }

    pub fn lookup(&self, city: &str, state: &str) -> Result<&[ForecastRow]> {
        self.get(&format!("{},{}", city, state))
            .ok_or_else(|| ForecastError::CityNotFound {
                city: city.to_string(),
                state: state.to_string(),
            })
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.forecasts.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// Fixed-width forecast table for one city: a time column followed by one
/// column per measurement.
pub fn render_forecast(rows: &[ForecastRow]) -> String {
    let width = LOOKUP_COLUMN_WIDTH;
    let mut out = String::new();

    out.push_str(&format!("{:<width$}", "Time"));
    for channel in Channel::ALL {
        out.push_str(&format!("{:<width$}", channel.display_name()));
    }
    out.push('\n');

    for row in rows {
        out.push_str(&format!("{:<width$}", format_valid_time(&row.valid_time)));
        for channel in Channel::ALL {
            out.push_str(&format!("{:<width$}", row.measurement(channel).unwrap_or("")));
        }
        out.push('\n');
    }

    out
}

/// Day and clock time of a `validTime`, e.g. `Mon 01 06:00`. Unrecognised
/// timestamps are shown without their year-month prefix.
pub fn format_valid_time(valid_time: &str) -> String {
    VALID_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(valid_time, format).ok())
        .map(|dt| dt.format("%a %d %H:%M").to_string())
        .unwrap_or_else(|| valid_time.chars().skip(8).collect())
}

#[derive(Debug, Serialize)]
pub struct TableSummary {
    pub total_rows: usize,
    pub cities: usize,
    pub states: usize,
    pub first_valid_time: Option<String>,
    pub last_valid_time: Option<String>,
    /// Share of rows with each measurement present, in percent.
    pub coverage: BTreeMap<&'static str, f64>,
}

impl TableSummary {
    pub fn from_rows(rows: &[ForecastRow]) -> Self {
        let cities: HashSet<(&str, &str)> = rows
            .iter()
            .map(|r| (r.city.as_str(), r.state_name.as_str()))
            .collect();
        let states: HashSet<&str> = rows.iter().map(|r| r.state_name.as_str()).collect();

        let coverage = Channel::ALL
            .iter()
            .map(|channel| {
                let present = rows.iter().filter(|r| r.measurement(*channel).is_some()).count();
                let percent = if rows.is_empty() {
                    0.0
                } else {
                    present as f64 / rows.len() as f64 * 100.0
                };
                (channel.field_name(), percent)
            })
            .collect();

        Self {
            total_rows: rows.len(),
            cities: cities.len(),
            states: states.len(),
            first_valid_time: rows.iter().map(|r| r.valid_time.clone()).min(),
            last_valid_time: rows.iter().map(|r| r.valid_time.clone()).max(),
            coverage,
        }
    }

    pub fn detailed_summary(&self) -> String {
        let mut summary = format!(
            "Forecast Table Summary\n\
             ======================\n\
             Rows:        {}\n\
             Cities:      {}\n\
             States:      {}\n\
             Valid times: {} to {}\n\
             \n\
             Field coverage:\n",
            self.total_rows,
            self.cities,
            self.states,
            self.first_valid_time.as_deref().unwrap_or("-"),
            self.last_valid_time.as_deref().unwrap_or("-"),
        );
        for (field, percent) in &self.coverage {
            summary.push_str(&format!("  {:<12} {:>6.1}%\n", field, percent));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CityRecord;

    fn row(city: &str, state: &str, time: &str, temp: &str) -> ForecastRow {
        let city = CityRecord::new(
            city.to_string(),
            state.to_string(),
            35.0,
            -90.0,
            None,
            String::new(),
        );
        ForecastRow::from_measurement(&city, time, Channel::Temperature, temp)
    }

    #[test]
    fn test_lookup_by_city_and_state() -> Result<()> {
        let index = ForecastIndex::from_rows(vec![
            row("Memphis", "Tennessee", "2024-01-01T06:00:00", "40"),
            row("Memphis", "Tennessee", "2024-01-01T09:00:00", "42"),
            row("Nashville", "Tennessee", "2024-01-01T06:00:00", "38"),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup("Memphis", "Tennessee")?.len(), 2);
        assert_eq!(index.get("Nashville, Tennessee").map(|r| r.len()), Some(1));
        assert!(index.get("Memphis").is_none());
        assert!(matches!(
            index.lookup("Memphis", "Egypt"),
            Err(ForecastError::CityNotFound { .. })
        ));
        assert_eq!(index.keys(), vec!["Memphis,Tennessee", "Nashville,Tennessee"]);
        Ok(())
    }

    #[test]
    fn test_render_forecast_columns() {
        let table = render_forecast(&[row("Memphis", "Tennessee", "2024-01-01T06:00:00", "40")]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Time           Temp           Chance_rain"));
        assert!(lines[1].starts_with("Mon 01 06:00   40             "));
    }

    #[test]
    fn test_format_valid_time() {
        assert_eq!(format_valid_time("2024-01-01T06:00:00"), "Mon 01 06:00");
        assert_eq!(format_valid_time("2024-01-02T18:00"), "Tue 02 18:00");
        assert_eq!(format_valid_time("202401011200"), "1200");
    }

    #[test]
    fn test_table_summary() {
        let rows = vec![
            row("Memphis", "Tennessee", "2024-01-01T09:00:00", "40"),
            row("Tulsa", "Oklahoma", "2024-01-01T06:00:00", "38"),
        ];

        let summary = TableSummary::from_rows(&rows);

        assert_eq!(summary.total_rows, 2);
        assert_eq!(summary.cities, 2);
        assert_eq!(summary.states, 2);
        assert_eq!(summary.first_valid_time.as_deref(), Some("2024-01-01T06:00:00"));
        assert_eq!(summary.coverage["temp"], 100.0);
        assert_eq!(summary.coverage["vis"], 0.0);
        assert!(summary.detailed_summary().contains("Cities:      2"));
    }
}
