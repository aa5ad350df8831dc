use tracing::debug;

use crate::error::RegmapError;
use crate::model::{Dataset, RawTable};
use crate::options::HeaderMode;

/// Concatenate tables by column position. The first table fixes the width.
pub fn merge_tables(tables: &[RawTable], header_mode: HeaderMode) -> Result<Dataset, RegmapError> {
    let Some(first) = tables.first() else {
        return Err(RegmapError::NoTablesExtracted);
    };
    let width = first.width();
    if width == 0 {
        return Err(RegmapError::NoTablesExtracted);
    }

    for (index, table) in tables.iter().enumerate() {
        if let Some(row) = table.rows.iter().find(|row| row.len() != width) {
            return Err(RegmapError::ColumnCountMismatch {
                table: index + 1,
                expected: width,
                found: row.len(),
            });
        }
    }

    let mut rows = tables
        .iter()
        .flat_map(|table| table.rows.iter().cloned())
        .collect::<Vec<_>>();

    let headers = match header_mode {
        HeaderMode::NoHeader => (0..width).map(|index| index.to_string()).collect(),
        HeaderMode::HasHeader => rows.remove(0),
    };

    debug!(
        tables = tables.len(),
        columns = width,
        rows = rows.len(),
        "merged extracted tables"
    );
    Ok(Dataset { headers, rows })
}
