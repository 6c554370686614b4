//! Point queries against GRIB2 forecast grids through an external decoder.

pub mod degrib;

pub use degrib::DegribDecoder;

use crate::error::Result;
use std::path::Path;

/// Produces the decoder's text output for one grid at one coordinate.
///
/// The output is line oriented: a header line followed by comma separated
/// lines ending in `...,<validTime>,<value>`.
pub trait Decoder: Send + Sync {
    fn decode(&self, grid: &Path, lat: f64, lng: f64) -> Result<String>;
}

/// Point argument in the form the decoder expects, e.g. `40.6943, -73.9249`.
pub fn format_point(lat: f64, lng: f64) -> String {
    format!("{}, {}", lat, lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_point() {
        assert_eq!(format_point(40.6943, -73.9249), "40.6943, -73.9249");
        assert_eq!(format_point(30.0, -97.5), "30, -97.5");
    }
}
