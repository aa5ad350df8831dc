use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::RegmapError;
use crate::locator::DocumentLocator;

/// Characters removed from every extracted cell unless overridden.
pub const DEFAULT_STRIP_CHARS: &str = " .\n";

pub const DEFAULT_SENSITIVITY: u8 = 65;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// Positional labels `0..n`; every extracted row is data.
    #[default]
    NoHeader,
    /// The first row of the first table becomes the header.
    HasHeader,
}

/// 1-based page numbers, kept as the inclusive ranges they were written as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    ranges: Vec<RangeInclusive<u32>>,
}

impl PageSelection {
    /// Inclusive, 1-based page range.
    pub fn range(beg: u32, end: u32) -> Result<Self, RegmapError> {
        format!("{beg}-{end}")
            .parse()
            .map_err(RegmapError::InvalidPageSelection)
    }

    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.ranges.iter().any(|range| range.contains(&page))
    }

    #[must_use]
    pub fn first(&self) -> Option<u32> {
        self.ranges.iter().map(|range| *range.start()).min()
    }

    #[must_use]
    pub fn last(&self) -> Option<u32> {
        self.ranges.iter().map(|range| *range.end()).max()
    }
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut ranges = Vec::new();
        for token in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start: u32 = start
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range start: '{start}'"))?;
                let end: u32 = end
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range end: '{end}'"))?;
                if start == 0 || end == 0 {
                    return Err("pages are 1-based".to_string());
                }
                if end < start {
                    return Err(format!(
                        "invalid range '{token}': end is smaller than start"
                    ));
                }
                ranges.push(start..=end);
            } else {
                let page: u32 = token
                    .parse()
                    .map_err(|_| format!("invalid page number: '{token}'"))?;
                if page == 0 {
                    return Err("pages are 1-based".to_string());
                }
                ranges.push(page..=page);
            }
        }

        if ranges.is_empty() {
            return Err("page selection cannot be empty".to_string());
        }

        Ok(Self { ranges })
    }
}

/// Table detection sensitivity, `1..=100`. Higher keeps more ragged tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sensitivity(u8);

impl Sensitivity {
    pub fn new(value: u8) -> Result<Self, RegmapError> {
        if (1..=100).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RegmapError::InvalidOption(format!(
                "sensitivity must be within 1..=100, got {value}"
            )))
        }
    }

    /// Minimum structural confidence a detected table needs to be kept.
    #[must_use]
    pub fn min_confidence(self) -> f32 {
        f32::from(100 - self.0) / 100.0
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self(DEFAULT_SENSITIVITY)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub pages: Option<PageSelection>,
    pub sensitivity: Sensitivity,
    pub strip_chars: String,
    pub min_cols: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            pages: None,
            sensitivity: Sensitivity::default(),
            strip_chars: DEFAULT_STRIP_CHARS.to_string(),
            min_cols: 2,
        }
    }
}

/// A column picked either by zero-based position or by header label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Index(usize),
    Label(String),
}

impl FromStr for ColumnRef {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Err("column cannot be empty".to_string());
        }
        if value.bytes().all(|byte| byte.is_ascii_digit()) {
            return value
                .parse()
                .map(Self::Index)
                .map_err(|error| format!("invalid column index '{value}': {error}"));
        }
        Ok(Self::Label(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    pub name: ColumnRef,
    pub address: ColumnRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingOptions {
    pub path: PathBuf,
    pub keep: bool,
}

/// Everything one run needs. Built once, then only borrowed.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub locator: DocumentLocator,
    pub peripheral: String,
    pub output: PathBuf,
    pub extract: ExtractOptions,
    pub header_mode: HeaderMode,
    pub columns: Option<ColumnSelection>,
    pub staging: Option<StagingOptions>,
}

impl GeneratorConfig {
    #[must_use]
    pub fn new(locator: DocumentLocator, peripheral: impl Into<String>) -> Self {
        let peripheral = peripheral.into();
        let output = default_output_path(&peripheral);
        Self {
            locator,
            peripheral,
            output,
            extract: ExtractOptions::default(),
            header_mode: HeaderMode::default(),
            columns: None,
            staging: None,
        }
    }

    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    #[must_use]
    pub fn with_extract_options(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }

    #[must_use]
    pub fn with_header_mode(mut self, header_mode: HeaderMode) -> Self {
        self.header_mode = header_mode;
        self
    }

    #[must_use]
    pub fn with_columns(mut self, columns: ColumnSelection) -> Self {
        self.columns = Some(columns);
        self
    }

    #[must_use]
    pub fn with_staging(mut self, staging: StagingOptions) -> Self {
        self.staging = Some(staging);
        self
    }
}

/// `<peripheral>_reg.h`, lower-cased.
#[must_use]
pub fn default_output_path(peripheral: &str) -> PathBuf {
    PathBuf::from(format!("{}_reg.h", peripheral.to_lowercase()))
}
