use tracing::debug;

use crate::error::RegmapError;
use crate::model::{DetectedTable, PageText, RawTable};
use crate::options::ExtractOptions;
use crate::pdf_reader::{read_document_text, read_pdf_pages};
use crate::table_detect::detect_tables;
use crate::table_parse::{normalize_rows, strip_cell};
use crate::warning::{ExtractWarning, WarningCode};

/// Output of one extractor call: tables in document order plus anything worth reporting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extraction {
    pub tables: Vec<RawTable>,
    pub warnings: Vec<ExtractWarning>,
}

/// Pulls raw tables out of a document. The rest of the pipeline only sees `RawTable`s.
pub trait TableExtractor {
    fn extract(&self, document: &[u8], options: &ExtractOptions)
    -> Result<Extraction, RegmapError>;
}

/// Text-layer extractor built on `lopdf` and `pdf-extract`.
///
/// PDFs do not expose ruling lines through these crates, so tables are
/// recovered from text layout: cells are separated by tabs or wide gaps and
/// consecutive multi-cell lines form a table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TableExtractor for PdfTextExtractor {
    fn extract(
        &self,
        document: &[u8],
        options: &ExtractOptions,
    ) -> Result<Extraction, RegmapError> {
        let mut warnings = Vec::new();
        let pages = read_pdf_pages(document, options.pages.as_ref())?;
        let mut detected = detect_tables(&pages, options.min_cols);

        // Without a page range the whole-document text is an equivalent source.
        if detected.is_empty() && options.pages.is_none() {
            if let Some(text) = read_document_text(document) {
                let fallback = detect_tables(
                    &[PageText {
                        page_number: 1,
                        text,
                    }],
                    options.min_cols,
                );
                if !fallback.is_empty() {
                    warnings.push(ExtractWarning::new(
                        WarningCode::DocumentFallback,
                        "no page-level tables detected; retried with document-level text extraction",
                    ));
                    detected = fallback;
                }
            }
        }

        let min_confidence = options.sensitivity.min_confidence();
        let mut tables = Vec::new();
        for table in detected {
            if table.confidence < min_confidence {
                warnings.push(
                    ExtractWarning::new(
                        WarningCode::LowConfidence,
                        "table confidence is below the detection sensitivity; skipped",
                    )
                    .with_page(table.page)
                    .with_confidence(table.confidence),
                );
                continue;
            }

            tables.push(finish_table(table, &options.strip_chars, &mut warnings));
        }

        if tables.is_empty() {
            warnings.push(ExtractWarning::new(
                WarningCode::NoTablesDetected,
                "no table rows were detected in the selected pages",
            ));
        }

        debug!(tables = tables.len(), "text-layer extraction finished");
        Ok(Extraction { tables, warnings })
    }
}

fn finish_table(
    table: DetectedTable,
    strip_chars: &str,
    warnings: &mut Vec<ExtractWarning>,
) -> RawTable {
    let width = table.rows.iter().map(Vec::len).max().unwrap_or(0);
    if table.rows.iter().any(|row| row.len() != width) {
        warnings.push(
            ExtractWarning::new(
                WarningCode::RaggedRows,
                format!("short rows padded to {width} column(s)"),
            )
            .with_page(table.page)
            .with_confidence(table.confidence),
        );
    }

    let rows = normalize_rows(&table.rows, width)
        .into_iter()
        .map(|row| {
            row.iter()
                .map(|cell| strip_cell(cell, strip_chars))
                .collect()
        })
        .collect();

    RawTable::new(table.page, rows)
}
