pub mod analyzers;
pub mod cli;
pub mod decoder;
pub mod download;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod settings;
pub mod utils;
pub mod writers;

pub use error::{ForecastError, Result};
