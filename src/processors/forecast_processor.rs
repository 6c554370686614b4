use crate::decoder::Decoder;
use crate::download::Workspace;
use crate::error::{ForecastError, Result};
use crate::models::{CityRecord, ForecastFile, ForecastRow};
use crate::processors::{IntegrityChecker, IntegrityReport, MergeStrategy, RowBuilder, TableAssembler};
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Decodes every (grid, city) pair and assembles the forecast table.
pub struct ForecastProcessor<D: Decoder> {
    decoder: D,
    max_workers: usize,
    merge_strategy: MergeStrategy,
}

impl<D: Decoder> ForecastProcessor<D> {
    pub fn new(decoder: D, max_workers: usize) -> Self {
        Self {
            decoder,
            max_workers: max_workers.max(1),
            merge_strategy: MergeStrategy::Fill,
        }
    }

    pub fn with_merge_strategy(mut self, merge_strategy: MergeStrategy) -> Self {
        self.merge_strategy = merge_strategy;
        self
    }

    /// Decode all grids for all cities, then assemble and check the table.
    pub fn process(
        &self,
        files: &[ForecastFile],
        workspace: &Workspace,
        cities: &[CityRecord],
        progress: Option<&ProgressReporter>,
    ) -> Result<(Vec<ForecastRow>, IntegrityReport)> {
        let rows = self.decode_all(files, workspace, cities, progress)?;

        if let Some(p) = progress {
            p.set_message("Assembling forecast table...");
        }

        let table = TableAssembler::with_strategy(self.merge_strategy).assemble(rows);
        let report = IntegrityChecker::new().check_table(&table);

        info!(
            "Assembled {} rows for {} cities ({} complete)",
            report.total_rows, report.cities, report.complete_rows
        );
        Ok((table, report))
    }

    /// Run the decoder once per (grid, city) pair on a bounded pool.
    ///
    /// Rows come back grouped by grid in catalog order, then by city in
    /// gazetteer order, whatever order the invocations finish in.
    pub fn decode_all(
        &self,
        files: &[ForecastFile],
        workspace: &Workspace,
        cities: &[CityRecord],
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<ForecastRow>> {
        let tasks: Vec<(&ForecastFile, &CityRecord)> = files
            .iter()
            .flat_map(|file| cities.iter().map(move |city| (file, city)))
            .collect();
        let empty_outputs = AtomicUsize::new(0);

        debug!(
            "Decoding {} grids x {} cities on {} workers",
            files.len(),
            cities.len(),
            self.max_workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ForecastError::Config(e.to_string()))?;

        let row_builder = RowBuilder::new();
        let decoded: Result<Vec<Vec<ForecastRow>>> = pool.install(|| {
            tasks
                .par_iter()
                .map(|(file, city)| {
                    let grid = workspace.path_for(file);
                    let output = self.decoder.decode(&grid, city.lat, city.lng)?;
                    let rows = row_builder.build_rows(&output, file, &grid, city)?;

                    if rows.is_empty() {
                        empty_outputs.fetch_add(1, Ordering::Relaxed);
                        debug!("No forecast entries in {} for {}", file.file_name, city.key());
                    }
                    if let Some(p) = progress {
                        p.increment(1);
                    }
                    Ok(rows)
                })
                .collect()
        });

        let rows: Vec<ForecastRow> = decoded?.into_iter().flatten().collect();

        let empty = empty_outputs.into_inner();
        if empty > 0 {
            warn!("{} of {} decoder runs returned no forecast entries", empty, tasks.len());
        }
        info!("Decoded {} rows from {} decoder runs", rows.len(), tasks.len());

        Ok(rows)
    }
}
