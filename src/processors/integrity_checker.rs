use crate::models::{Channel, ForecastRow};
use crate::processors::table_assembler::sort_rows;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub total_rows: usize,
    pub complete_rows: usize,
    pub cities: usize,
    pub duplicate_keys: Vec<TableViolation>,
    pub ordering_violations: Vec<TableViolation>,
    /// Rows missing each measurement, keyed by output column name.
    pub missing_by_field: BTreeMap<&'static str, usize>,
}

impl IntegrityReport {
    pub fn is_consistent(&self) -> bool {
        self.duplicate_keys.is_empty() && self.ordering_violations.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableViolation {
    pub row: usize,
    pub city: String,
    pub state_name: String,
    pub valid_time: String,
}

impl TableViolation {
    fn at(row: usize, record: &ForecastRow) -> Self {
        Self {
            row,
            city: record.city.clone(),
            state_name: record.state_name.clone(),
            valid_time: record.valid_time.clone(),
        }
    }
}

pub struct IntegrityChecker;

impl IntegrityChecker {
    pub fn new() -> Self {
        Self
    }

    /// Check an assembled table for key uniqueness, ordering and coverage.
    pub fn check_table(&self, rows: &[ForecastRow]) -> IntegrityReport {
        let mut seen = HashSet::with_capacity(rows.len());
        let mut cities = HashSet::new();
        let mut duplicate_keys = Vec::new();
        let mut ordering_violations = Vec::new();
        let mut missing_by_field: BTreeMap<&'static str, usize> =
            Channel::ALL.iter().map(|c| (c.field_name(), 0)).collect();
        let mut complete_rows = 0;

        for (i, row) in rows.iter().enumerate() {
            if !seen.insert((&row.city, &row.state_name, &row.valid_time)) {
                duplicate_keys.push(TableViolation::at(i, row));
            }
            cities.insert((&row.city, &row.state_name));

            if i > 0 {
                let previous = &rows[i - 1];
                let out_of_order = previous.city > row.city
                    || (previous.city == row.city && previous.valid_time > row.valid_time);
                if out_of_order {
                    ordering_violations.push(TableViolation::at(i, row));
                }
            }

            let mut complete = true;
            for channel in Channel::ALL {
                if row.measurement(channel).is_none() {
                    complete = false;
                    if let Some(count) = missing_by_field.get_mut(channel.field_name()) {
                        *count += 1;
                    }
                }
            }
            if complete {
                complete_rows += 1;
            }
        }

        IntegrityReport {
            total_rows: rows.len(),
            complete_rows,
            cities: cities.len(),
            duplicate_keys,
            ordering_violations,
            missing_by_field,
        }
    }

    /// Same check on a copy sorted into table order; used for tables read
    /// back from disk where ordering is not guaranteed.
    pub fn check_unordered(&self, rows: &[ForecastRow]) -> IntegrityReport {
        let mut sorted = rows.to_vec();
        sort_rows(&mut sorted);
        self.check_table(&sorted)
    }

    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = format!(
            "Forecast Table Integrity\n\
             ========================\n\
             Rows:            {}\n\
             Cities:          {}\n\
             Complete rows:   {}\n\
             Duplicate keys:  {}\n\
             Out of order:    {}\n",
            report.total_rows,
            report.cities,
            report.complete_rows,
            report.duplicate_keys.len(),
            report.ordering_violations.len(),
        );

        let gaps: Vec<String> = report
            .missing_by_field
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(field, count)| format!("  {}: {} rows missing", field, count))
            .collect();
        if gaps.is_empty() {
            summary.push_str("All measurement fields populated\n");
        } else {
            summary.push_str("Missing measurements:\n");
            summary.push_str(&gaps.join("\n"));
            summary.push('\n');
        }

        for violation in report.duplicate_keys.iter().take(5) {
            summary.push_str(&format!(
                "  duplicate row {}: {}, {} @ {}\n",
                violation.row, violation.city, violation.state_name, violation.valid_time
            ));
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}
