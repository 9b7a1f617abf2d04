//! CSV rendering of an item list.

use std::io::{self, Write};

use crate::items::ItemList;

/// First line of every export.
pub const HEADER: &str = "S.NO,Component,Value,Total Quantity,PCB Quantity";

/// Name used when a module has no name yet.
pub const FALLBACK_NAME: &str = "module";

/// Write the header and one row per item to `out`.
///
/// Text fields are always quoted; embedded quotes are doubled. Every line,
/// the last included, ends with `\n`.
pub fn write_csv<W: Write>(out: &mut W, items: &ItemList) -> io::Result<()> {
    writeln!(out, "{HEADER}")?;
    for item in items {
        writeln!(
            out,
            "{},{},{},{},{}",
            item.serial_no,
            quote(&item.component),
            quote(&item.value),
            item.total_quantity,
            item.pcb_quantity
        )?;
    }
    Ok(())
}

/// Render the CSV export to a string.
pub fn to_csv(items: &ItemList) -> String {
    let mut buf = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = write_csv(&mut buf, items);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Export file name: `<name>_<version>_BOM.csv`.
///
/// A blank name becomes `module`. Path separators and NUL are replaced by
/// `_` so the name never escapes the target directory.
pub fn file_name(name: &str, version: &str) -> String {
    let name = if name.trim().is_empty() {
        FALLBACK_NAME
    } else {
        name
    };
    format!("{}_{}_BOM.csv", sanitize(name), sanitize(version))
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect()
}
