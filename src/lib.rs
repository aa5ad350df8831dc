mod clean;
mod emit;
mod error;
mod extract;
mod locator;
mod merge;
mod model;
mod options;
mod pdf_reader;
mod select;
mod staging;
mod table_detect;
mod table_parse;
mod warning;

use std::path::PathBuf;

use tracing::{info, warn};

use crate::clean::{ADDRESS_COLUMN, NAME_COLUMN};

pub use clean::{clean, is_reserved};
pub use emit::{
    addresses_are_prefixed, emit, include_guard, peripheral_prefix, register_entries, render_header,
};
pub use error::RegmapError;
pub use extract::{Extraction, PdfTextExtractor, TableExtractor};
pub use locator::DocumentLocator;
pub use merge::merge_tables;
pub use model::{Dataset, RawTable, RegisterEntry};
pub use options::{
    ColumnRef, ColumnSelection, DEFAULT_SENSITIVITY, DEFAULT_STRIP_CHARS, ExtractOptions,
    GeneratorConfig, HeaderMode, PageSelection, Sensitivity, StagingOptions, default_output_path,
};
pub use select::{SelectedColumns, prompt_for_columns, resolve_column, select_columns};
pub use staging::StagingFile;
pub use warning::{ExtractWarning, WarningCode};

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub table_count: usize,
    pub merged_rows: usize,
    pub register_count: usize,
    pub output_path: PathBuf,
    pub warnings: Vec<ExtractWarning>,
}

/// Load the configured document and run the extractor over it.
pub fn extract_tables<E>(config: &GeneratorConfig, extractor: &E) -> Result<Extraction, RegmapError>
where
    E: TableExtractor + ?Sized,
{
    let document = config.locator.load()?;
    let extraction = extractor.extract(&document, &config.extract)?;
    for warning in &extraction.warnings {
        warn!(
            code = ?warning.code,
            page = ?warning.page,
            confidence = ?warning.confidence,
            "{}",
            warning.message
        );
    }
    Ok(extraction)
}

/// Merge the tables, passing them through the staging file when one is configured.
pub fn build_dataset(
    config: &GeneratorConfig,
    tables: &[RawTable],
) -> Result<Dataset, RegmapError> {
    let merged = merge_tables(tables, config.header_mode)?;
    let Some(options) = &config.staging else {
        return Ok(merged);
    };

    let staging = StagingFile::create(&options.path, &merged.headers)?;
    for (index, table) in tables.iter().enumerate() {
        let skip = usize::from(index == 0 && config.header_mode == HeaderMode::HasHeader);
        staging.append(&table.rows[skip..])?;
    }
    let reloaded = staging.load()?;

    if options.keep {
        info!(path = %staging.path().display(), "keeping staging file");
    } else {
        staging.remove()?;
    }
    Ok(reloaded)
}

/// Everything after extraction: merge, pick columns, clean, write the header.
///
/// `choose_columns` is only called when the configuration carries no column selection.
pub fn generate_from_tables<F>(
    config: &GeneratorConfig,
    extraction: Extraction,
    choose_columns: F,
) -> Result<GenerationReport, RegmapError>
where
    F: FnOnce(&[String]) -> Result<ColumnSelection, RegmapError>,
{
    if extraction.tables.is_empty() {
        return Err(RegmapError::NoTablesExtracted);
    }

    let merged = build_dataset(config, &extraction.tables)?;
    let selection = match &config.columns {
        Some(selection) => selection.clone(),
        None => choose_columns(&merged.headers)?,
    };
    let columns = select_columns(&merged.headers, &selection)?;

    let cleaned = clean(&merged, &columns);
    let prefix = peripheral_prefix(&config.peripheral);
    let register_count = emit(
        &cleaned,
        NAME_COLUMN,
        ADDRESS_COLUMN,
        &prefix,
        &config.output,
    )?;

    info!(
        tables = extraction.tables.len(),
        merged_rows = merged.row_count(),
        registers = register_count,
        "register header generated"
    );

    Ok(GenerationReport {
        table_count: extraction.tables.len(),
        merged_rows: merged.row_count(),
        register_count,
        output_path: config.output.clone(),
        warnings: extraction.warnings,
    })
}

/// Run the full pipeline for one datasheet.
pub fn generate_header<E, F>(
    config: &GeneratorConfig,
    extractor: &E,
    choose_columns: F,
) -> Result<GenerationReport, RegmapError>
where
    E: TableExtractor + ?Sized,
    F: FnOnce(&[String]) -> Result<ColumnSelection, RegmapError>,
{
    let extraction = extract_tables(config, extractor)?;
    generate_from_tables(config, extraction, choose_columns)
}
