use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use crate::error::RegmapError;
use crate::model::Dataset;

/// Transient CSV that table fragments are appended to and the merged dataset is reloaded from.
#[derive(Debug)]
pub struct StagingFile {
    path: PathBuf,
}

impl StagingFile {
    /// Start a fresh staging file holding only the header record.
    pub fn create(path: &Path, headers: &[String]) -> Result<Self, RegmapError> {
        remove_if_exists(path)?;
        let mut writer = WriterBuilder::new().from_path(path)?;
        writer.write_record(headers)?;
        writer.flush()?;
        debug!(path = %path.display(), "created staging file");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, rows: &[Vec<String>]) -> Result<(), RegmapError> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Reload everything appended so far. Records of differing width are an error.
    pub fn load(&self) -> Result<Dataset, RegmapError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_path(&self.path)?;
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader
            .records()
            .map(|record| record.map(|record| record.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;
        Ok(Dataset { headers, rows })
    }

    pub fn remove(self) -> Result<(), RegmapError> {
        remove_if_exists(&self.path)
    }
}

fn remove_if_exists(path: &Path) -> Result<(), RegmapError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error.into()),
    }
}
