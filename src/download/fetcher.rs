//! Sequential download of the forecast grids into the scratch directory.

use crate::download::Workspace;
use crate::error::{ForecastError, Result};
use crate::models::ForecastFile;
use crate::utils::progress::ProgressReporter;
use futures::StreamExt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct ForecastFetcher {
    client: reqwest::Client,
}

impl ForecastFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Download every file in order. The first failure aborts the run.
    pub async fn fetch_all(
        &self,
        files: &[ForecastFile],
        workspace: &Workspace,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(files.len());
        let mut total_bytes = 0u64;

        for file in files {
            if let Some(p) = progress {
                p.set_message(&format!("Fetching {}", file.file_name));
            }

            let dest = workspace.path_for(file);
            total_bytes += self.fetch_one(&file.url, &dest).await?;
            paths.push(dest);

            if let Some(p) = progress {
                p.increment(1);
            }
        }

        info!(
            "Fetched {} forecast files ({} bytes) into {}",
            paths.len(),
            total_bytes,
            workspace.root().display()
        );
        Ok(paths)
    }

    /// Stream `url` into `dest`, replacing any existing file. Returns the
    /// number of bytes written.
    pub async fn fetch_one(&self, url: &str, dest: &Path) -> Result<u64> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ForecastError::fetch(url, e))?;

        if !response.status().is_success() {
            return Err(ForecastError::fetch(
                url,
                format!("server responded {}", response.status()),
            ));
        }

        let file = File::create(dest).map_err(|e| ForecastError::filesystem(dest, e))?;
        let mut writer = BufWriter::new(file);
        let mut written = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ForecastError::fetch(url, format!("error reading body: {}", e)))?;
            writer
                .write_all(&chunk)
                .map_err(|e| ForecastError::filesystem(dest, e))?;
            written += chunk.len() as u64;
        }
        writer.flush().map_err(|e| ForecastError::filesystem(dest, e))?;

        debug!("Saved {} bytes to {}", written, dest.display());
        Ok(written)
    }
}

impl Default for ForecastFetcher {
    fn default() -> Self {
        Self::new()
    }
}
