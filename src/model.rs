#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// One table region as produced by an extractor: rows of cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    pub page: u32,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    #[must_use]
    pub fn new(page: u32, rows: Vec<Vec<String>>) -> Self {
        Self { page, rows }
    }

    /// Width of the widest row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DetectedTable {
    pub page: u32,
    pub rows: Vec<Vec<String>>,
    pub confidence: f32,
}

/// All extracted tables concatenated under one header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Values of one column, top to bottom. Short rows yield `""`.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map_or("", String::as_str))
    }
}

/// A single `#define` line worth of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterEntry<'a> {
    pub name: &'a str,
    pub address: &'a str,
}
