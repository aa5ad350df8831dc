use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::model::Dataset;
use crate::select::SelectedColumns;

static RESERVED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)reserved").expect("hardcoded reserved regex is valid"));

/// Column positions in a cleaned dataset.
pub const NAME_COLUMN: usize = 0;
pub const ADDRESS_COLUMN: usize = 1;

#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED_RE.is_match(name)
}

/// Reduce a merged dataset to `[name, address]` register rows.
///
/// Steps run in order: keep only the two selected columns, drop every row
/// whose value occurs more than once (page-repeated header lines), drop rows
/// with an empty address or name, drop reserved registers, and turn tabs in
/// names into underscores. Surviving rows keep their relative order.
#[must_use]
pub fn clean(dataset: &Dataset, columns: &SelectedColumns) -> Dataset {
    let projected = dataset
        .rows
        .iter()
        .map(|row| {
            vec![
                row.get(columns.name).cloned().unwrap_or_default(),
                row.get(columns.address).cloned().unwrap_or_default(),
            ]
        })
        .collect::<Vec<_>>();

    let mut occurrences: HashMap<&[String], usize> = HashMap::new();
    for row in &projected {
        *occurrences.entry(row.as_slice()).or_insert(0) += 1;
    }
    let unique = projected
        .iter()
        .filter(|row| occurrences.get(row.as_slice()) == Some(&1))
        .collect::<Vec<_>>();
    let duplicates = projected.len() - unique.len();

    let mut missing = 0_usize;
    let mut reserved = 0_usize;
    let mut rows = Vec::with_capacity(unique.len());
    for row in unique {
        let name = &row[NAME_COLUMN];
        let address = &row[ADDRESS_COLUMN];
        if address.trim().is_empty() || name.trim().is_empty() {
            missing += 1;
            continue;
        }
        if is_reserved(name) {
            reserved += 1;
            continue;
        }
        rows.push(vec![name.replace('\t', "_"), address.clone()]);
    }

    debug!(
        kept = rows.len(),
        duplicates, missing, reserved, "cleaned register rows"
    );

    Dataset {
        headers: vec![columns.name_label.clone(), columns.address_label.clone()],
        rows,
    }
}
