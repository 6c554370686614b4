use crate::models::{Channel, ForecastRow};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// How the single-measurement rows are combined into wide rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Sort, forward-fill then back-fill across the whole table, drop
    /// duplicate keys keeping the first row.
    #[default]
    Fill,
    /// Outer join on (city, state_name, validTime), then fill gaps within
    /// each city only.
    Join,
}

pub struct TableAssembler {
    strategy: MergeStrategy,
}

impl TableAssembler {
    pub fn new() -> Self {
        Self {
            strategy: MergeStrategy::Fill,
        }
    }

    pub fn with_strategy(strategy: MergeStrategy) -> Self {
        Self { strategy }
    }

    /// Build the final table: unique on (city, state_name, validTime) and
    /// ordered by (city, validTime).
    pub fn assemble(&self, rows: Vec<ForecastRow>) -> Vec<ForecastRow> {
        let input_rows = rows.len();

        let table = match self.strategy {
            MergeStrategy::Fill => {
                let mut rows = rows;
                sort_rows(&mut rows);
                let all: Vec<usize> = (0..rows.len()).collect();
                fill(&mut rows, &all);
                drop_duplicate_keys(rows)
            }
            MergeStrategy::Join => {
                let mut rows = join_rows(rows);
                sort_rows(&mut rows);
                for indices in city_groups(&rows) {
                    fill(&mut rows, &indices);
                }
                rows
            }
        };

        debug!(
            "Assembled {} rows into {} with {:?} strategy",
            input_rows,
            table.len(),
            self.strategy
        );
        table
    }
}

impl Default for TableAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Order by city, then by `validTime` as text. Stable, so rows with equal
/// keys keep their production order.
fn compare_rows(a: &ForecastRow, b: &ForecastRow) -> Ordering {
    a.city
        .cmp(&b.city)
        .then_with(|| a.valid_time.cmp(&b.valid_time))
}

pub fn sort_rows(rows: &mut [ForecastRow]) {
    rows.sort_by(compare_rows);
}

/// Forward-fill each measurement over `indices`, then back-fill what is still
/// missing at the start.
fn fill(rows: &mut [ForecastRow], indices: &[usize]) {
    for channel in Channel::ALL {
        let mut last: Option<String> = None;
        for &i in indices {
            let slot = rows[i].measurement_mut(channel);
            if slot.is_some() {
                last = slot.clone();
            } else {
                *slot = last.clone();
            }
        }

        let mut next: Option<String> = None;
        for &i in indices.iter().rev() {
            let slot = rows[i].measurement_mut(channel);
            if slot.is_some() {
                next = slot.clone();
            } else {
                *slot = next.clone();
            }
        }
    }
}

fn drop_duplicate_keys(rows: Vec<ForecastRow>) -> Vec<ForecastRow> {
    let mut seen: HashSet<(String, String, String)> = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| {
            seen.insert((
                row.city.clone(),
                row.state_name.clone(),
                row.valid_time.clone(),
            ))
        })
        .collect()
}

/// Merge rows sharing (city, state_name, validTime); the first value seen for
/// a measurement wins.
fn join_rows(rows: Vec<ForecastRow>) -> Vec<ForecastRow> {
    let mut positions: HashMap<(String, String, String), usize> = HashMap::new();
    let mut joined: Vec<ForecastRow> = Vec::new();

    for row in rows {
        let key = (
            row.city.clone(),
            row.state_name.clone(),
            row.valid_time.clone(),
        );
        match positions.get(&key) {
            Some(&i) => {
                let target = &mut joined[i];
                for channel in Channel::ALL {
                    if target.measurement(channel).is_none() {
                        if let Some(value) = row.measurement(channel) {
                            target.set_measurement(channel, value);
                        }
                    }
                }
            }
            None => {
                positions.insert(key, joined.len());
                joined.push(row);
            }
        }
    }

    joined
}

/// Row indices per (city, state_name), each in table order.
fn city_groups(rows: &[ForecastRow]) -> Vec<Vec<usize>> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), Vec<usize>> = HashMap::new();

    for (i, row) in rows.iter().enumerate() {
        let key = (row.city.clone(), row.state_name.clone());
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(i);
    }

    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CityRecord;
    use pretty_assertions::assert_eq;

    fn city(name: &str, state: &str) -> CityRecord {
        CityRecord::new(
            name.to_string(),
            state.to_string(),
            35.0,
            -90.0,
            Some(1000),
            "America/Chicago".to_string(),
        )
    }

    fn row(c: &CityRecord, time: &str, channel: Channel, value: &str) -> ForecastRow {
        ForecastRow::from_measurement(c, time, channel, value)
    }

    #[test]
    fn test_sorted_by_city_then_time() {
        let a = city("A", "Texas");
        let b = city("B", "Texas");
        let rows = vec![
            row(&b, "2024-01-01T06:00", Channel::Temperature, "1"),
            row(&a, "2024-01-02T00:00", Channel::Temperature, "2"),
            row(&a, "2024-01-01T00:00", Channel::Temperature, "3"),
        ];

        let table = TableAssembler::new().assemble(rows);

        let keys: Vec<(&str, &str)> = table
            .iter()
            .map(|r| (r.city.as_str(), r.valid_time.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("A", "2024-01-01T00:00"),
                ("A", "2024-01-02T00:00"),
                ("B", "2024-01-01T06:00"),
            ]
        );
    }

    #[test]
    fn test_forward_fill_preferred_over_back_fill() {
        let a = city("A", "Texas");
        let rows = vec![
            row(&a, "T0", Channel::SnowAmount, "0.5"),
            row(&a, "T1", Channel::Temperature, "40"),
            row(&a, "T2", Channel::SnowAmount, "2.0"),
        ];

        let table = TableAssembler::new().assemble(rows);

        assert_eq!(table[1].valid_time, "T1");
        assert_eq!(table[1].snow_amt.as_deref(), Some("0.5"));
        // leading gap back-filled
        assert_eq!(table[0].temp.as_deref(), Some("40"));
    }

    #[test]
    fn test_back_fill_supplies_leading_gap() {
        let a = city("A", "Texas");
        let rows = vec![
            row(&a, "T1", Channel::Temperature, "40"),
            row(&a, "T2", Channel::SnowAmount, "1.0"),
        ];

        let table = TableAssembler::new().assemble(rows);

        assert_eq!(table[0].snow_amt.as_deref(), Some("1.0"));
        assert_eq!(table[1].temp.as_deref(), Some("40"));
    }

    #[test]
    fn test_duplicates_keep_first_after_fill() {
        let a = city("A", "Texas");
        let rows = vec![
            row(&a, "T1", Channel::Temperature, "40"),
            row(&a, "T1", Channel::ChanceRain, "20"),
            row(&a, "T1", Channel::Temperature, "41"),
        ];

        let table = TableAssembler::new().assemble(rows);

        assert_eq!(table.len(), 1);
        assert_eq!(table[0].temp.as_deref(), Some("40"));
        assert_eq!(table[0].chance_rain.as_deref(), Some("20"));
    }

    #[test]
    fn test_same_city_name_in_two_states_kept_apart() {
        let springfield_il = city("Springfield", "Illinois");
        let springfield_mo = city("Springfield", "Missouri");
        let rows = vec![
            row(&springfield_il, "T1", Channel::Temperature, "30"),
            row(&springfield_mo, "T1", Channel::Temperature, "35"),
        ];

        let table = TableAssembler::new().assemble(rows);

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].state_name, "Illinois");
        assert_eq!(table[1].state_name, "Missouri");
    }

    #[test]
    fn test_join_does_not_fill_across_cities() {
        let a = city("A", "Texas");
        let b = city("B", "Texas");
        let rows = vec![
            row(&a, "T1", Channel::Temperature, "40"),
            row(&a, "T1", Channel::Visibility, "10"),
            row(&b, "T1", Channel::Temperature, "50"),
        ];

        let joined = TableAssembler::with_strategy(MergeStrategy::Join).assemble(rows.clone());
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].vis.as_deref(), Some("10"));
        assert_eq!(joined[1].vis, None);

        // the table-wide fill carries A's visibility into B
        let filled = TableAssembler::new().assemble(rows);
        assert_eq!(filled[1].vis.as_deref(), Some("10"));
    }

    #[test]
    fn test_join_merges_channels_per_key() {
        let a = city("A", "Texas");
        let rows = vec![
            row(&a, "T2", Channel::Temperature, "41"),
            row(&a, "T1", Channel::Temperature, "40"),
            row(&a, "T1", Channel::WindSpeed, "5"),
            row(&a, "T2", Channel::WindDirection, "180"),
        ];

        let table = TableAssembler::with_strategy(MergeStrategy::Join).assemble(rows);

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].valid_time, "T1");
        assert_eq!(table[0].wind_spd.as_deref(), Some("5"));
        assert_eq!(table[0].wind_dir.as_deref(), Some("180"));
        assert_eq!(table[1].wind_spd.as_deref(), Some("5"));
    }

    #[test]
    fn test_empty_input() {
        assert!(TableAssembler::new().assemble(Vec::new()).is_empty());
        assert!(TableAssembler::with_strategy(MergeStrategy::Join)
            .assemble(Vec::new())
            .is_empty());
    }
}
