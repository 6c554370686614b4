pub mod forecast_analyzer;

pub use forecast_analyzer::{format_valid_time, render_forecast, ForecastIndex, TableSummary};
