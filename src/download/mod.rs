pub mod fetcher;
pub mod workspace;

pub use fetcher::ForecastFetcher;
pub use workspace::Workspace;
