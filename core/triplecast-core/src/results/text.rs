//! Plain-text table serialization for tabular results.
//!
//! An aligned ASCII table: dashed rule, header row, `=` rule, data rows,
//! dashed rule. Literals are shown quoted with their language tag or
//! datatype, URIs in angle brackets, blank nodes with the `_:` prefix.

use super::{CellValue, TabularResult};
use crate::error::EncodeResult;
use std::io::Write;

/// Text-table serializer
pub struct TextResultSerializer;

impl TextResultSerializer {
    /// Serialize a tabular result as an aligned text table
    pub fn serialize<W: Write>(result: &TabularResult, writer: &mut W) -> EncodeResult<()> {
        let rendered: Vec<Vec<String>> = result
            .rows()
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        let mut widths: Vec<usize> = result.columns().iter().map(|c| c.chars().count()).collect();
        for row in &rendered {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        // total width: cells padded to width+2, plus the separator bars
        let total: usize = widths.iter().map(|w| w + 3).sum::<usize>() + 1;

        writeln!(writer, "{}", "-".repeat(total))?;
        write_row(writer, result.columns(), &widths)?;
        writeln!(writer, "{}", "=".repeat(total))?;
        for row in &rendered {
            write_row(writer, row, &widths)?;
        }
        writeln!(writer, "{}", "-".repeat(total))?;
        Ok(())
    }
}

fn write_row<W: Write, S: AsRef<str>>(
    writer: &mut W,
    cells: &[S],
    widths: &[usize],
) -> EncodeResult<()> {
    write!(writer, "|")?;
    for (cell, width) in cells.iter().zip(widths) {
        let cell = cell.as_ref();
        let padding = width.saturating_sub(cell.chars().count());
        write!(writer, " {cell}{} |", " ".repeat(padding))?;
    }
    writeln!(writer)?;
    Ok(())
}

fn cell_text(cell: &Option<CellValue>) -> String {
    match cell {
        None => String::new(),
        Some(CellValue::Uri(uri)) => format!("<{uri}>"),
        Some(CellValue::BlankNode(label)) => format!("_:{label}"),
        Some(CellValue::Literal {
            value,
            language,
            datatype,
        }) => {
            let mut text = format!("\"{value}\"");
            if let Some(language) = language {
                text.push('@');
                text.push_str(language);
            } else if let Some(datatype) = datatype {
                text.push_str("^^<");
                text.push_str(datatype);
                text.push('>');
            }
            text
        }
    }
}
