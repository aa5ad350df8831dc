use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegmapError {
    #[error("input document not found: {0}")]
    InputNotFound(String),

    #[error("failed to fetch remote document: {0}")]
    Fetch(String),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("no tables were extracted from the selected pages")]
    NoTablesExtracted,

    #[error("no pages available after applying selection")]
    NoPagesSelected,

    #[error("invalid page selection: {0}")]
    InvalidPageSelection(String),

    #[error("table {table} has {found} column(s), expected {expected} like the first table")]
    ColumnCountMismatch {
        table: usize,
        expected: usize,
        found: usize,
    },

    #[error("column index {index} is out of range ({count} column(s) available)")]
    ColumnOutOfRange { index: usize, count: usize },

    #[error("no column labelled '{0}'")]
    UnknownColumn(String),

    #[error("invalid column selection: {0}")]
    InvalidColumnInput(String),

    #[error("column {0} cannot be both the name and the address column")]
    SameColumnSelected(usize),

    #[error("failed to write '{}': {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("staging file error: {0}")]
    Staging(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

impl RegmapError {
    /// True for the errors caused by a bad column choice.
    #[must_use]
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            Self::ColumnOutOfRange { .. }
                | Self::UnknownColumn(_)
                | Self::InvalidColumnInput(_)
                | Self::SameColumnSelected(_)
        )
    }
}
