use std::io::{BufRead, Write};

use tracing::debug;

use crate::error::RegmapError;
use crate::options::{ColumnRef, ColumnSelection};

/// The resolved name and address columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedColumns {
    pub name: usize,
    pub name_label: String,
    pub address: usize,
    pub address_label: String,
}

pub fn resolve_column(headers: &[String], column: &ColumnRef) -> Result<usize, RegmapError> {
    match column {
        ColumnRef::Index(index) => {
            if *index < headers.len() {
                Ok(*index)
            } else {
                Err(RegmapError::ColumnOutOfRange {
                    index: *index,
                    count: headers.len(),
                })
            }
        }
        ColumnRef::Label(label) => headers
            .iter()
            .position(|header| header == label)
            .or_else(|| {
                headers
                    .iter()
                    .position(|header| header.eq_ignore_ascii_case(label))
            })
            .ok_or_else(|| RegmapError::UnknownColumn(label.clone())),
    }
}

pub fn select_columns(
    headers: &[String],
    selection: &ColumnSelection,
) -> Result<SelectedColumns, RegmapError> {
    let name = resolve_column(headers, &selection.name)?;
    let address = resolve_column(headers, &selection.address)?;
    if name == address {
        return Err(RegmapError::SameColumnSelected(name));
    }

    debug!(name, address, "selected register columns");
    Ok(SelectedColumns {
        name,
        name_label: headers[name].clone(),
        address,
        address_label: headers[address].clone(),
    })
}

const NOTICE: &str = "\
########################## USER NOTICE ##########################

Since there are a lot of variations between data sheets, you must
select the columns containing the register names and addresses to
get the most accurate results.

Enter the column number (or label) of the register names and of
the register addresses.
";

/// Ask for the two columns on a console.
///
/// Accepts either a single `name,addr` line or two separate lines.
pub fn prompt_for_columns<R, W>(
    headers: &[String],
    input: &mut R,
    output: &mut W,
) -> Result<ColumnSelection, RegmapError>
where
    R: BufRead,
    W: Write,
{
    writeln!(output)?;
    write!(output, "{NOTICE}")?;
    writeln!(output)?;
    for (index, header) in headers.iter().enumerate() {
        writeln!(output, "  [{index}] {header}")?;
    }
    writeln!(output)?;
    writeln!(
        output,
        "#################################################################"
    )?;
    writeln!(output)?;

    write!(output, "Enter the column number of the register names: ")?;
    output.flush()?;
    let first = read_answer(input)?;

    if let Some((name, address)) = first.split_once(',') {
        return Ok(ColumnSelection {
            name: parse_answer(name)?,
            address: parse_answer(address)?,
        });
    }

    write!(
        output,
        "Enter the column number of the register addresses: "
    )?;
    output.flush()?;
    let second = read_answer(input)?;

    Ok(ColumnSelection {
        name: parse_answer(&first)?,
        address: parse_answer(&second)?,
    })
}

fn read_answer<R: BufRead>(input: &mut R) -> Result<String, RegmapError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(RegmapError::InvalidColumnInput(
            "input closed before a column was entered".to_string(),
        ));
    }
    Ok(line.trim().to_string())
}

fn parse_answer(answer: &str) -> Result<ColumnRef, RegmapError> {
    answer.parse().map_err(RegmapError::InvalidColumnInput)
}
