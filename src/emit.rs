use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::error::RegmapError;
use crate::model::{Dataset, RegisterEntry};

static NON_IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Z0-9_]").expect("hardcoded identifier regex is valid"));

/// Spaces between the longest macro name and its address.
const NAME_PADDING: usize = 2;
/// Minimum width of the right-aligned address field.
const ADDRESS_WIDTH: usize = 4;

/// Macro prefix for a peripheral: `uart0` becomes `UART0_`.
#[must_use]
pub fn peripheral_prefix(peripheral: &str) -> String {
    let upper = peripheral.trim().to_uppercase();
    let mut prefix = NON_IDENT_RE.replace_all(&upper, "_").into_owned();
    if !prefix.ends_with('_') {
        prefix.push('_');
    }
    prefix
}

#[must_use]
pub fn include_guard(prefix: &str) -> String {
    format!("{prefix}H_")
}

pub fn register_entries(
    dataset: &Dataset,
    name_col: usize,
    addr_col: usize,
) -> impl Iterator<Item = RegisterEntry<'_>> {
    dataset.rows.iter().map(move |row| RegisterEntry {
        name: row.get(name_col).map_or("", String::as_str),
        address: row.get(addr_col).map_or("", String::as_str),
    })
}

/// Whole-column decision: if any address already carries `0x` (either case), none get one added.
#[must_use]
pub fn addresses_are_prefixed(dataset: &Dataset, addr_col: usize) -> bool {
    dataset
        .column(addr_col)
        .any(|address| address.contains("0x") || address.contains("0X"))
}

/// Render the complete header text.
#[must_use]
pub fn render_header(dataset: &Dataset, name_col: usize, addr_col: usize, prefix: &str) -> String {
    let macros = register_entries(dataset, name_col, addr_col)
        .map(|entry| {
            let macro_name = format!("{prefix}{}", entry.name.to_uppercase());
            (macro_name, entry.address)
        })
        .collect::<Vec<_>>();

    let longest_name = macros
        .iter()
        .map(|(macro_name, _)| macro_name.chars().count() - prefix.chars().count())
        .max()
        .unwrap_or(0);
    let width = prefix.chars().count() + longest_name + NAME_PADDING;
    let add_prefix = !addresses_are_prefixed(dataset, addr_col);

    let defines = macros
        .iter()
        .map(|(macro_name, address)| {
            let address = if add_prefix {
                format!("0x{address}")
            } else {
                (*address).to_string()
            };
            format!("#define {macro_name:<width$}{address:>ADDRESS_WIDTH$}\n")
        })
        .collect::<String>();

    let guard = include_guard(prefix);
    format!("#ifndef {guard}\n#define {guard}\n\n{defines}\n#endif\n")
}

/// Render and write the header, replacing any existing file.
pub fn emit(
    dataset: &Dataset,
    name_col: usize,
    addr_col: usize,
    prefix: &str,
    output_path: &Path,
) -> Result<usize, RegmapError> {
    let contents = render_header(dataset, name_col, addr_col, prefix);
    std::fs::write(output_path, contents).map_err(|source| RegmapError::WriteFailed {
        path: output_path.to_path_buf(),
        source,
    })?;

    info!(
        path = %output_path.display(),
        registers = dataset.row_count(),
        "wrote register header"
    );
    Ok(dataset.row_count())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{emit, include_guard, peripheral_prefix, render_header};
    use crate::error::RegmapError;
    use crate::model::Dataset;

    fn dataset(rows: &[(&str, &str)]) -> Dataset {
        Dataset {
            headers: vec!["name".to_string(), "address".to_string()],
            rows: rows
                .iter()
                .map(|(name, address)| vec![(*name).to_string(), (*address).to_string()])
                .collect(),
        }
    }

    #[test]
    fn prefix_is_uppercase_identifier_with_trailing_underscore() {
        assert_eq!(peripheral_prefix("uart"), "UART_");
        assert_eq!(peripheral_prefix("i2c-1"), "I2C_1_");
        assert_eq!(peripheral_prefix("SPI_"), "SPI_");
        assert_eq!(include_guard("UART_"), "UART_H_");
    }

    #[test]
    fn renders_aligned_defines_with_added_prefix() {
        let header = render_header(
            &dataset(&[("cr", "00"), ("status", "04"), ("dr", "1C")]),
            0,
            1,
            "UART_",
        );

        assert_eq!(
            header,
            "#ifndef UART_H_\n\
             #define UART_H_\n\
             \n\
             #define UART_CR      0x00\n\
             #define UART_STATUS  0x04\n\
             #define UART_DR      0x1C\n\
             \n\
             #endif\n"
        );
    }

    #[test]
    fn any_prefixed_address_leaves_all_addresses_verbatim() {
        let header = render_header(
            &dataset(&[("STATUS", "4F"), ("CTRL", "0x10")]),
            0,
            1,
            "DEV_",
        );

        assert!(header.contains("#define DEV_STATUS    4F\n"));
        assert!(header.contains("#define DEV_CTRL    0x10\n"));
        assert!(!header.contains("0x4F"));
        assert!(!header.contains("0x0x"));
    }

    #[test]
    fn uppercase_hex_marker_counts_as_prefixed() {
        let header = render_header(&dataset(&[("CR", "0X1C"), ("SR", "0X20")]), 0, 1, "U_");

        assert!(header.contains("#define U_CR  0X1C\n"));
        assert!(header.contains("#define U_SR  0X20\n"));
        assert!(!header.contains("0x0X"));
    }

    #[test]
    fn empty_dataset_still_has_guards() {
        let header = render_header(&dataset(&[]), 0, 1, "GPIO_");
        assert_eq!(header, "#ifndef GPIO_H_\n#define GPIO_H_\n\n\n#endif\n");
    }

    #[test]
    fn emit_overwrites_existing_file_identically() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("uart_reg.h");
        std::fs::write(&path, "stale contents that are longer than the header").expect("seed");

        let data = dataset(&[("CR", "00"), ("SR", "04")]);
        assert_eq!(emit(&data, 0, 1, "UART_", &path).expect("first emit"), 2);
        let first = std::fs::read(&path).expect("read first");
        emit(&data, 0, 1, "UART_", &path).expect("second emit");
        let second = std::fs::read(&path).expect("read second");

        assert_eq!(first, second);
        assert!(!String::from_utf8_lossy(&first).contains("stale"));
    }

    #[test]
    fn unwritable_path_is_a_write_failure() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("missing-dir").join("uart_reg.h");
        let err = emit(&dataset(&[("CR", "00")]), 0, 1, "UART_", &path)
            .expect_err("parent directory does not exist");
        assert!(matches!(err, RegmapError::WriteFailed { .. }));
    }
}
