use std::path::PathBuf;

use anyhow::{Result, bail};
use catsim_material_data::MaterialRecord;
use catsim_materials::{MaterialLibrary, ParseOptions, elements, read_material};

/// Parse each file and print one status line per file.
/// Fails when any file does.
pub fn check(files: &[PathBuf], options: &ParseOptions) -> Result<()> {
    let mut failed = 0usize;
    for path in files {
        match read_material(path, options) {
            Ok(record) => println!(
                "ok    {} ({} elements, {:.6} g/cm3)",
                path.display(),
                record.element_count(),
                record.density
            ),
            Err(e) => {
                failed += 1;
                let reason = e
                    .format_error()
                    .map_or_else(|| e.to_string(), ToString::to_string);
                println!("FAIL  {}: {reason}", path.display());
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} material files failed validation", files.len());
    }
    Ok(())
}

pub fn show(name: &str, paths: &[PathBuf], options: &ParseOptions) -> Result<()> {
    print!("{}", describe(name, paths, options)?);
    Ok(())
}

/// Resolve `name` in `paths`, or in `CATSIM_MATERIAL_PATH` when none are
/// given, and render its composition.
fn describe(name: &str, paths: &[PathBuf], options: &ParseOptions) -> Result<String> {
    let library = if paths.is_empty() {
        MaterialLibrary::from_env()
    } else {
        MaterialLibrary::new(paths.iter().cloned())
    };
    let record = library.with_options(*options)?.get(name)?;
    Ok(render(&record))
}

fn render(record: &MaterialRecord) -> String {
    let mut out = String::new();
    let title = if record.name.is_empty() {
        "(unnamed)"
    } else {
        record.name.as_str()
    };
    out.push_str(&format!("{title}\n"));
    out.push_str(&format!("  density  {:.6} g/cm3\n", record.density));
    out.push_str(&format!("  {:>3}  {:<3}  {:>10}\n", "Z", "sym", "fraction"));
    for element in &record.elements {
        let symbol = elements::symbol(element.atomic_number).unwrap_or("?");
        out.push_str(&format!(
            "  {:>3}  {:<3}  {:>10.6}\n",
            element.atomic_number, symbol, element.mass_fraction
        ));
    }
    out.push_str(&format!("  sum           {:>10.6}\n", record.total_fraction()));
    out
}
