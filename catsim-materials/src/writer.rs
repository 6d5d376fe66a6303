use std::fmt::Write as _;
use std::path::Path;

use catsim_material_data::MaterialRecord;

use crate::elements;
use crate::error::{FormatError, MaterialError, Result};
use crate::options::ParseOptions;
use crate::parser::{COUNT_LABEL, DENSITY_LABEL, NAME_LABEL, ROWS_LABEL};
use crate::validate::validate;

/// Render a record in the same layout the material calculator produces.
///
/// The record is validated with default options first. Values are written
/// with six decimals when that loses nothing, otherwise in full.
pub fn write_material(record: &MaterialRecord) -> std::result::Result<String, FormatError> {
    write_material_with(record, &ParseOptions::default())
}

/// Like [`write_material`], validating with `options` instead.
pub fn write_material_with(
    record: &MaterialRecord,
    options: &ParseOptions,
) -> std::result::Result<String, FormatError> {
    validate(record, options)?;

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "# {NAME_LABEL}");
    let _ = writeln!(out, "# {}", record.name);
    let _ = writeln!(out, "# {COUNT_LABEL}");
    let _ = writeln!(out, "{}", record.elements.len());
    let _ = writeln!(out, "# {DENSITY_LABEL}");
    let _ = writeln!(out, "{}", number(record.density));
    let _ = writeln!(out, "# {ROWS_LABEL}");
    for element in &record.elements {
        let label = elements::name(element.atomic_number).unwrap_or("unknown");
        let _ = writeln!(
            out,
            "{} {} # {label}",
            element.atomic_number,
            number(element.mass_fraction)
        );
    }
    Ok(out)
}

/// Write a record to `path`, replacing any existing file.
pub fn write_material_file(
    path: impl AsRef<Path>,
    record: &MaterialRecord,
    options: &ParseOptions,
) -> Result<()> {
    let path = path.as_ref();
    let text = write_material_with(record, options)?;
    std::fs::write(path, text).map_err(|source| MaterialError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// f64 Display is the shortest exact decimal and never uses an exponent.
fn number(value: f64) -> String {
    let short = format!("{value:.6}");
    if short.parse::<f64>() == Ok(value) {
        short
    } else {
        value.to_string()
    }
}
