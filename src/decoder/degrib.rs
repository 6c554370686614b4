use crate::decoder::{format_point, Decoder};
use crate::error::{ForecastError, Result};
use crate::utils::constants::DEFAULT_DECODER_COMMAND;
use std::path::Path;
use std::process::Command;
use tracing::trace;

/// Runs `degrib <grid> -P -pnt "<lat>, <lng>"` and captures its stdout.
#[derive(Debug, Clone)]
pub struct DegribDecoder {
    command: String,
}

impl DegribDecoder {
    pub fn new() -> Self {
        Self {
            command: DEFAULT_DECODER_COMMAND.to_string(),
        }
    }

    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for DegribDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for DegribDecoder {
    fn decode(&self, grid: &Path, lat: f64, lng: f64) -> Result<String> {
        let point = format_point(lat, lng);
        trace!("{} {} -P -pnt \"{}\"", self.command, grid.display(), point);

        let output = Command::new(&self.command)
            .arg(grid)
            .arg("-P")
            .arg("-pnt")
            .arg(&point)
            .output()
            .map_err(|e| {
                ForecastError::decode(grid, lat, lng, format!("cannot run '{}': {}", self.command, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ForecastError::decode(
                grid,
                lat,
                lng,
                format!("'{}' exited with {}: {}", self.command, output.status, stderr.trim()),
            ));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| ForecastError::decode(grid, lat, lng, format!("output is not UTF-8: {}", e)))
    }
}
