use crate::error::{ForecastError, Result};
use crate::models::ForecastFile;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Scratch directory holding the downloaded forecast grids for one run.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create `root` if needed; otherwise remove every file directly inside it
    /// so grids from an earlier run can't be picked up by name.
    pub fn prepare(root: impl Into<PathBuf>) -> Result<Self> {
        let workspace = Self { root: root.into() };

        if workspace.root.is_dir() {
            let removed = workspace.clear()?;
            debug!(
                "Cleared {} stale files from {}",
                removed,
                workspace.root.display()
            );
        } else {
            fs::create_dir_all(&workspace.root)
                .map_err(|e| ForecastError::filesystem(&workspace.root, e))?;
            debug!("Created scratch directory {}", workspace.root.display());
        }

        Ok(workspace)
    }

    /// Attach to an existing scratch directory without touching its contents.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ForecastError::filesystem(
                &root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "scratch directory does not exist"),
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, file: &ForecastFile) -> PathBuf {
        self.root.join(&file.file_name)
    }

    /// Paths of `files` that are not present in the workspace.
    pub fn missing_files<'a>(&self, files: &'a [ForecastFile]) -> Vec<&'a ForecastFile> {
        files
            .iter()
            .filter(|f| !self.path_for(f).is_file())
            .collect()
    }

    /// Remove the run's files, leaving the directory itself in place.
    pub fn teardown(self) -> Result<()> {
        let removed = self.clear()?;
        debug!("Removed {} files from {}", removed, self.root.display());
        Ok(())
    }

    fn clear(&self) -> Result<usize> {
        let entries = fs::read_dir(&self.root).map_err(|e| ForecastError::filesystem(&self.root, e))?;
        let mut removed = 0;

        for entry in entries {
            let entry = entry.map_err(|e| ForecastError::filesystem(&self.root, e))?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|e| ForecastError::filesystem(&path, e))?;

            if file_type.is_dir() {
                continue;
            }
            fs::remove_file(&path).map_err(|e| ForecastError::filesystem(&path, e))?;
            removed += 1;
        }

        Ok(removed)
    }
}
