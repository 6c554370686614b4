pub mod forecast_reader;
pub mod gazetteer_reader;

pub use forecast_reader::ForecastTableReader;
pub use gazetteer_reader::GazetteerReader;
