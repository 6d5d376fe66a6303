use std::path::Path;

use anyhow::{Context, Result, bail};
use catsim_material_data::{BundleEntry, MaterialBundle};
use catsim_materials::{ParseOptions, decode_bundle, material_files, read_material};

/// Parse every material file in `dir`. Any malformed file aborts the run.
pub fn collect_bundle(dir: &Path, options: &ParseOptions) -> Result<MaterialBundle> {
    let files = material_files(dir);
    if files.is_empty() {
        bail!("no material files found in {dir:?}");
    }

    let mut entries = Vec::with_capacity(files.len());
    for path in files {
        let key = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("non UTF-8 file name: {path:?}"))?
            .to_string();
        let record = read_material(&path, options)?;
        log::debug!("  {key}: {} elements", record.element_count());
        entries.push(BundleEntry { key, record });
    }

    Ok(MaterialBundle {
        version: format!("catsim-material-pack {}", env!("CARGO_PKG_VERSION")),
        entries,
    })
}

/// Serialize with postcard and compress with zstd.
/// Returns (serialized length, compressed bytes).
pub fn compress_bundle(bundle: &MaterialBundle, level: i32) -> Result<(usize, Vec<u8>)> {
    let serialized = postcard::to_allocvec(bundle).context("postcard serialization failed")?;
    let compressed =
        zstd::encode_all(&serialized[..], level).context("zstd compression failed")?;
    Ok((serialized.len(), compressed))
}

/// Decode `compressed` the way the library will and compare with `expected`.
pub fn verify_bundle(
    compressed: &[u8],
    expected: &MaterialBundle,
    options: &ParseOptions,
) -> Result<()> {
    let decoded = decode_bundle(compressed, options).context("round-trip decode failed")?;
    if &decoded != expected {
        bail!("round-trip mismatch: decoded bundle differs from the packed one");
    }
    Ok(())
}

pub fn run(dir: &Path, output: &Path, level: i32, options: &ParseOptions) -> Result<()> {
    log::info!("Parsing material files from {dir:?}...");
    let bundle = collect_bundle(dir, options)?;
    log::info!("  Materials: {} entries", bundle.entries.len());

    log::info!("Compressing with zstd (level {level})...");
    let (serialized_len, compressed) = compress_bundle(&bundle, level)?;
    log::info!(
        "  {} bytes -> {} bytes ({:.1}x)",
        serialized_len,
        compressed.len(),
        serialized_len as f64 / compressed.len() as f64
    );

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {parent:?}"))?;
    }
    std::fs::write(output, &compressed).with_context(|| format!("failed to write {output:?}"))?;
    log::info!("Wrote {output:?}");

    verify_bundle(&compressed, &bundle, options)?;
    log::info!("  Round-trip OK");
    Ok(())
}
