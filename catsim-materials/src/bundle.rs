use std::io::Read;

use catsim_material_data::MaterialBundle;

use crate::error::{MaterialError, Result};
use crate::options::ParseOptions;
use crate::validate::validate;

/// Decode a zstd-compressed, postcard-encoded material bundle.
///
/// Every entry is validated again with `options`, so a bundle packed under
/// looser settings is rejected here rather than later.
pub fn decode_bundle(compressed: &[u8], options: &ParseOptions) -> Result<MaterialBundle> {
    options.check()?;
    let mut decoder = ruzstd::decoding::StreamingDecoder::new(compressed)
        .map_err(|e| MaterialError::Bundle(format!("zstd header: {e}")))?;
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| MaterialError::Bundle(format!("zstd stream: {e}")))?;

    let bundle: MaterialBundle = postcard::from_bytes(&decompressed)
        .map_err(|e| MaterialError::Bundle(format!("postcard: {e}")))?;

    for entry in &bundle.entries {
        validate(&entry.record, options).map_err(|source| {
            MaterialError::Bundle(format!("entry '{}': {source}", entry.key))
        })?;
    }

    log::debug!(
        "decoded material bundle {} with {} entries",
        bundle.version,
        bundle.entries.len()
    );
    Ok(bundle)
}
