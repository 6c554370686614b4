use crate::analyzers::{render_forecast, ForecastIndex, TableSummary};
use crate::cli::args::{Cli, Commands};
use crate::decoder::DegribDecoder;
use crate::download::{ForecastFetcher, Workspace};
use crate::error::{ForecastError, Result};
use crate::models::forecast_catalog;
use crate::processors::{ForecastProcessor, IntegrityChecker};
use crate::readers::{ForecastTableReader, GazetteerReader};
use crate::settings::Settings;
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvWriter, ParquetWriter};
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use validator::Validate;

const LOOKUP_PROMPT: &str = "> ";
const LOOKUP_EXIT: &str = "EXIT";
const CITY_NOT_AVAILABLE: &str = "City Not Available";

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.verbose, cli.quiet, cli.log_file.as_ref())?;

    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Build {
            gazetteer,
            output,
            scratch_dir,
            row_cap,
            max_workers,
            merge_strategy,
            decoder,
            base_url,
            skip_fetch,
            parquet,
            compression,
        } => {
            override_with(&mut settings.gazetteer_path, gazetteer);
            override_with(&mut settings.output_path, output);
            override_with(&mut settings.scratch_dir, scratch_dir);
            override_with(&mut settings.row_cap, row_cap);
            override_with(&mut settings.max_workers, max_workers);
            override_with(&mut settings.merge_strategy, merge_strategy);
            override_with(&mut settings.decoder_command, decoder);
            override_with(&mut settings.base_url, base_url);
            settings.validate()?;

            build(&settings, skip_fetch, parquet, &compression, cli.quiet).await?;
        }

        Commands::Fetch {
            scratch_dir,
            base_url,
        } => {
            override_with(&mut settings.scratch_dir, scratch_dir);
            override_with(&mut settings.base_url, base_url);
            settings.validate()?;

            let workspace = Workspace::prepare(&settings.scratch_dir)?;
            let files = forecast_catalog(&settings.base_url);
            let progress = ProgressReporter::new(files.len() as u64, "Fetching grids...", cli.quiet);
            let paths = ForecastFetcher::new()
                .fetch_all(&files, &workspace, Some(&progress))
                .await?;
            progress.finish_with_message(&format!("Fetched {} grids", paths.len()));

            for path in paths {
                println!("{}", path.display());
            }
        }

        Commands::Lookup { input, city, state } => {
            let input = input.unwrap_or(settings.output_path);
            let index = ForecastIndex::load(&input)?;
            info!("Loaded forecasts for {} cities from {}", index.len(), input.display());

            match (city, state) {
                (Some(city), Some(state)) => {
                    let rows = index.lookup(&city, &state)?;
                    print!("{}", render_forecast(rows));
                }
                _ => {
                    let stdin = io::stdin();
                    let stdout = io::stdout();
                    lookup_prompt(&index, stdin.lock(), stdout.lock())?;
                }
            }
        }

        Commands::Info { input, json } => {
            let input = input.unwrap_or(settings.output_path);
            let progress = ProgressReporter::new_spinner("Reading forecast table...", cli.quiet);
            let rows = ForecastTableReader::new().read_rows(&input)?;
            let summary = TableSummary::from_rows(&rows);
            progress.finish_with_message(&format!("Read {} rows", rows.len()));

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Forecast table: {}\n", input.display());
                println!("{}", summary.detailed_summary());

                let report = IntegrityChecker::new().check_table(&rows);
                println!("{}", IntegrityChecker::new().generate_summary(&report));
            }
        }
    }

    Ok(())
}

async fn build(
    settings: &Settings,
    skip_fetch: bool,
    parquet: Option<PathBuf>,
    compression: &str,
    quiet: bool,
) -> Result<()> {
    // Fail on an unknown codec before spending time on the pipeline
    let parquet_writer = match parquet {
        Some(path) => Some((ParquetWriter::new().with_compression(compression)?, path)),
        None => None,
    };

    let cities = GazetteerReader::new()
        .with_row_cap(settings.row_cap)
        .with_excluded_states(settings.excluded_states.clone())
        .read_cities(&settings.gazetteer_path)?;

    let files = forecast_catalog(&settings.base_url);
    let workspace = if skip_fetch {
        let workspace = Workspace::open(&settings.scratch_dir)?;
        if let Some(missing) = workspace.missing_files(&files).first() {
            return Err(ForecastError::filesystem(
                workspace.path_for(missing),
                io::Error::new(io::ErrorKind::NotFound, "grid not fetched; run without --skip-fetch"),
            ));
        }
        workspace
    } else {
        let workspace = Workspace::prepare(&settings.scratch_dir)?;
        let progress = ProgressReporter::new(files.len() as u64, "Fetching grids...", quiet);
        ForecastFetcher::new()
            .fetch_all(&files, &workspace, Some(&progress))
            .await?;
        progress.finish_with_message("Grids fetched");
        workspace
    };

    let decoder = DegribDecoder::with_command(settings.decoder_command.clone());
    let processor = ForecastProcessor::new(decoder, settings.max_workers)
        .with_merge_strategy(settings.merge_strategy);
    let progress = ProgressReporter::new(
        (files.len() * cities.len()) as u64,
        "Decoding grids...",
        quiet,
    );

    // Decoding blocks on subprocesses; keep it off the async runtime
    let (workspace, decoded) = tokio::task::spawn_blocking(move || {
        let decoded = processor.process(&files, &workspace, &cities, Some(&progress));
        if let Ok((table, _)) = &decoded {
            progress.finish_with_message(&format!("Assembled {} rows", table.len()));
        }
        (workspace, decoded)
    })
    .await
    .map_err(|e| ForecastError::Config(format!("decode task failed: {}", e)))?;
    let (table, report) = decoded?;

    println!("\n{}", IntegrityChecker::new().generate_summary(&report));
    if !report.is_consistent() {
        warn!("Forecast table failed integrity checks");
    }

    CsvWriter::new().write_rows(&table, &settings.output_path)?;
    println!("Wrote {}", settings.output_path.display());

    if let Some((writer, path)) = parquet_writer {
        writer.write_rows(&table, &path)?;
        println!("\n{}", writer.get_file_info(&path)?.summary());
    }

    if !settings.keep_scratch {
        workspace.teardown()?;
    }

    Ok(())
}

/// Read `city,state` keys until `EXIT` or end of input, printing each
/// city's forecast table.
pub fn lookup_prompt<R: BufRead, W: Write>(index: &ForecastIndex, input: R, mut output: W) -> Result<()> {
    write!(output, "{}", LOOKUP_PROMPT)?;
    output.flush()?;

    for line in input.lines() {
        let key = line?;
        let key = key.trim();
        if key == LOOKUP_EXIT {
            break;
        }

        match index.get(key) {
            Some(rows) => write!(output, "{}", render_forecast(rows))?,
            None => writeln!(output, "{}", CITY_NOT_AVAILABLE)?,
        }

        write!(output, "{}", LOOKUP_PROMPT)?;
        output.flush()?;
    }

    Ok(())
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn init_tracing(verbose: bool, quiet: bool, log_file: Option<&PathBuf>) -> Result<()> {
    let default_level = match (verbose, quiet) {
        (true, _) => "ndfd_forecast=debug",
        (false, true) => "ndfd_forecast=warn",
        (false, false) => "ndfd_forecast=info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (stderr_layer, file_layer) = match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|e| ForecastError::write(path, e))?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false);
            (None, Some(layer))
        }
        None => {
            let layer = fmt::layer().with_writer(io::stderr).with_target(false);
            (Some(layer), None)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ForecastError::Config(format!("Failed to initialise logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Channel, CityRecord, ForecastRow};

    fn index() -> ForecastIndex {
        let city = CityRecord::new(
            "Tulsa".to_string(),
            "Oklahoma".to_string(),
            36.1284,
            -95.9037,
            None,
            String::new(),
        );
        ForecastIndex::from_rows(vec![ForecastRow::from_measurement(
            &city,
            "2024-01-01T06:00:00",
            Channel::Temperature,
            "51",
        )])
    }

    fn run_prompt(input: &str) -> Result<String> {
        let mut output = Vec::new();
        lookup_prompt(&index(), input.as_bytes(), &mut output)?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    #[test]
    fn test_prompt_prints_forecast_then_exits() -> Result<()> {
        let output = run_prompt("Tulsa,Oklahoma\nEXIT\nTulsa,Oklahoma\n")?;

        assert!(output.starts_with("> Time"));
        assert!(output.contains("Mon 01 06:00"));
        assert_eq!(output.matches("Time ").count(), 1);
        assert!(output.ends_with("> "));
        Ok(())
    }

    #[test]
    fn test_prompt_unknown_city() -> Result<()> {
        let output = run_prompt("Atlantis,Ocean\n")?;

        assert_eq!(output, "> City Not Available\n> ");
        Ok(())
    }

    #[test]
    fn test_override_with() {
        let mut value = 10;
        override_with(&mut value, None);
        assert_eq!(value, 10);
        override_with(&mut value, Some(3));
        assert_eq!(value, 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_build_from_existing_grids() -> Result<()> {
        use std::fs;
        use tempfile::TempDir;

        let temp_dir = TempDir::new()?;
        let gazetteer = temp_dir.path().join("uscities.csv");
        fs::write(
            &gazetteer,
            "city,state_name,lat,lng,population,timezone\n\
             Juneau,Alaska,,-134.4197,32113,America/Juneau\n\
             Tulsa,Oklahoma,36.1284,-95.9037,655479,America/Chicago\n",
        )?;

        let settings = Settings {
            gazetteer_path: gazetteer,
            scratch_dir: temp_dir.path().join("bin"),
            output_path: temp_dir.path().join("out").join("weather_data.csv"),
            decoder_command: "sh".to_string(),
            base_url: "http://localhost:1/unused".to_string(),
            max_workers: 2,
            keep_scratch: false,
            ..Settings::default()
        };

        // Each grid is a script for `sh` printing one entry valued by its own name
        let workspace = Workspace::prepare(&settings.scratch_dir)?;
        for file in forecast_catalog(&settings.base_url) {
            fs::write(
                workspace.path_for(&file),
                "echo header\necho \"X,2024-01-01T06:00:00,$(basename \"$0\" .bin)\"\n",
            )?;
        }

        build(&settings, true, None, "snappy", true).await?;

        let rows = ForecastTableReader::new().read_rows(&settings.output_path)?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].city, "Tulsa");
        assert_eq!(rows[0].temp.as_deref(), Some("temp_1_3"));
        assert_eq!(rows[0].vis.as_deref(), Some("vis"));
        assert_eq!(fs::read_dir(&settings.scratch_dir)?.count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_build_skip_fetch_requires_all_grids() -> Result<()> {
        use std::fs;
        use tempfile::TempDir;

        let temp_dir = TempDir::new()?;
        let gazetteer = temp_dir.path().join("uscities.csv");
        fs::write(
            &gazetteer,
            "city,state_name,lat,lng,population,timezone\nTulsa,Oklahoma,36.1284,-95.9037,655479,America/Chicago\n",
        )?;
        let settings = Settings {
            gazetteer_path: gazetteer,
            scratch_dir: temp_dir.path().join("bin"),
            output_path: temp_dir.path().join("weather_data.csv"),
            ..Settings::default()
        };
        Workspace::prepare(&settings.scratch_dir)?;

        let result = build(&settings, true, None, "snappy", true).await;

        assert!(matches!(result, Err(ForecastError::Filesystem { .. })));
        assert!(!settings.output_path.exists());
        Ok(())
    }
}
