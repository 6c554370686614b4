pub mod channel;
pub mod city;
pub mod forecast;

pub use channel::{forecast_catalog, Channel, ForecastFile, Horizon};
pub use city::CityRecord;
pub use forecast::ForecastRow;
