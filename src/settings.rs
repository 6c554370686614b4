use crate::error::{ForecastError, Result};
use crate::processors::MergeStrategy;
use crate::utils::constants::{
    DEFAULT_BASE_URL, DEFAULT_CONFIG_FILE, DEFAULT_DECODER_COMMAND, DEFAULT_GAZETTEER_PATH,
    DEFAULT_OUTPUT_PATH, DEFAULT_ROW_CAP, DEFAULT_SCRATCH_DIR, ENV_PREFIX, EXCLUDED_STATES,
};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Run configuration. Layered as defaults, then an optional TOML file, then
/// `NDFD_*` environment variables; CLI flags are applied on top by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    pub gazetteer_path: PathBuf,

    #[validate(range(min = 1))]
    pub row_cap: usize,

    pub excluded_states: Vec<String>,

    pub scratch_dir: PathBuf,

    pub output_path: PathBuf,

    #[validate(length(min = 1))]
    pub decoder_command: String,

    #[validate(length(min = 1))]
    pub base_url: String,

    #[validate(range(min = 1))]
    pub max_workers: usize,

    pub merge_strategy: MergeStrategy,

    /// Leave the downloaded grids in the scratch directory after the run.
    pub keep_scratch: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gazetteer_path: PathBuf::from(DEFAULT_GAZETTEER_PATH),
            row_cap: DEFAULT_ROW_CAP,
            excluded_states: EXCLUDED_STATES.iter().map(|s| s.to_string()).collect(),
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            decoder_command: DEFAULT_DECODER_COMMAND.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_workers: num_cpus::get(),
            merge_strategy: MergeStrategy::default(),
            keep_scratch: true,
        }
    }
}

impl Settings {
    /// Load settings from `config_file` (or `ndfd-forecast.toml` in the working
    /// directory when it exists) and the environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ForecastError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                builder = builder.add_source(File::from(path));
            }
            None => {
                builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));
            }
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("excluded_states"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }
}
