use crate::processors::MergeStrategy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ndfd-forecast")]
#[command(about = "Builds a city forecast table from NDFD forecast grids")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide progress bars")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Settings file [default: ndfd-forecast.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the forecast grids, decode them for every city and write the table
    Build {
        #[arg(short, long, help = "City gazetteer CSV [default: uscities.csv]")]
        gazetteer: Option<PathBuf>,

        #[arg(short, long, help = "Output CSV path [default: weather_data.csv]")]
        output: Option<PathBuf>,

        #[arg(short, long, help = "Scratch directory for grids [default: bin]")]
        scratch_dir: Option<PathBuf>,

        #[arg(long, help = "Gazetteer rows to read [default: 1000]")]
        row_cap: Option<usize>,

        #[arg(long, help = "Concurrent decoder invocations [default: CPU count]")]
        max_workers: Option<usize>,

        #[arg(long, value_enum, help = "How measurement rows are merged [default: fill]")]
        merge_strategy: Option<MergeStrategy>,

        #[arg(long, help = "Decoder executable [default: degrib]")]
        decoder: Option<String>,

        #[arg(long, help = "Forecast expression directory URL")]
        base_url: Option<String>,

        #[arg(long, help = "Reuse grids already in the scratch directory")]
        skip_fetch: bool,

        #[arg(long, help = "Also write the table as Parquet")]
        parquet: Option<PathBuf>,

        #[arg(short, long, default_value = "snappy")]
        compression: String,
    },

    /// Download the forecast grids into the scratch directory
    Fetch {
        #[arg(short, long, help = "Scratch directory for grids [default: bin]")]
        scratch_dir: Option<PathBuf>,

        #[arg(long, help = "Forecast expression directory URL")]
        base_url: Option<String>,
    },

    /// Print the forecast for a city
    Lookup {
        #[arg(short, long, help = "Forecast CSV [default: weather_data.csv]")]
        input: Option<PathBuf>,

        #[arg(long, requires = "state")]
        city: Option<String>,

        #[arg(long, requires = "city")]
        state: Option<String>,
    },

    /// Summarise a forecast CSV
    Info {
        #[arg(short, long, help = "Forecast CSV [default: weather_data.csv]")]
        input: Option<PathBuf>,

        #[arg(long, help = "Print the summary as JSON")]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_flags() {
        let cli = Cli::parse_from([
            "ndfd-forecast",
            "--quiet",
            "build",
            "--row-cap",
            "50",
            "--merge-strategy",
            "join",
            "--skip-fetch",
            "--base-url",
            "http://localhost:8080/ndfd",
        ]);

        assert!(cli.quiet);
        match cli.command {
            Commands::Build {
                row_cap,
                merge_strategy,
                base_url,
                skip_fetch,
                compression,
                ..
            } => {
                assert_eq!(row_cap, Some(50));
                assert_eq!(merge_strategy, Some(MergeStrategy::Join));
                assert_eq!(base_url.as_deref(), Some("http://localhost:8080/ndfd"));
                assert!(skip_fetch);
                assert_eq!(compression, "snappy");
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_lookup_city_requires_state() {
        assert!(Cli::try_parse_from(["ndfd-forecast", "lookup", "--city", "Tulsa"]).is_err());
        assert!(Cli::try_parse_from([
            "ndfd-forecast",
            "lookup",
            "--city",
            "Tulsa",
            "--state",
            "Oklahoma"
        ])
        .is_ok());
    }
}
