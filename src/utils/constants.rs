/// Gazetteer columns projected into a `CityRecord`
pub const GAZETTEER_COLUMNS: [&str; 6] = ["city", "state_name", "lat", "lng", "population", "timezone"];

/// Regions the CONUS grids do not cover
pub const EXCLUDED_STATES: [&str; 3] = ["Puerto Rico", "Hawaii", "Alaska"];

/// Processing defaults
pub const DEFAULT_ROW_CAP: usize = 1000;
pub const DEFAULT_GAZETTEER_PATH: &str = "uscities.csv";
pub const DEFAULT_SCRATCH_DIR: &str = "bin";
pub const DEFAULT_OUTPUT_PATH: &str = "weather_data.csv";
pub const DEFAULT_DECODER_COMMAND: &str = "degrib";
pub const DEFAULT_CONFIG_FILE: &str = "ndfd-forecast.toml";
pub const ENV_PREFIX: &str = "NDFD";

/// NDFD CONUS expression directory on the NWS distribution server
pub const DEFAULT_BASE_URL: &str =
    "https://tgftp.nws.noaa.gov/SL.us008001/ST.expr/DF.gr2/DC.ndfd/AR.conus";

/// Output
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const LOOKUP_COLUMN_WIDTH: usize = 15;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
