use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use catsim_material_data::MaterialRecord;

use crate::bundle::decode_bundle;
use crate::error::{MaterialError, Result};
use crate::options::ParseOptions;
use crate::parser::parse_with;

/// Environment variable holding the material search path.
pub const MATERIAL_PATH_ENV: &str = "CATSIM_MATERIAL_PATH";

/// Parse the material file at `path`.
pub fn read_material(path: impl AsRef<Path>, options: &ParseOptions) -> Result<MaterialRecord> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| MaterialError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_with(&text, options).map_err(|source| MaterialError::Format {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves materials by name, the way the simulation engine asks for them.
///
/// Lookup order: records already loaded, bundled records, `name` as a
/// direct path, `<dir>/<name>` for each search directory, then a
/// case-insensitive file name match. Parsed records are cached and shared.
pub struct MaterialLibrary {
    search_paths: Vec<PathBuf>,
    options: ParseOptions,
    bundled: HashMap<String, Arc<MaterialRecord>>,
    cache: RwLock<HashMap<String, Arc<MaterialRecord>>>,
}

impl MaterialLibrary {
    pub fn new<I, P>(search_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        MaterialLibrary {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
            options: ParseOptions::default(),
            bundled: HashMap::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Library searching the directories listed in `CATSIM_MATERIAL_PATH`.
    pub fn from_env() -> Self {
        let paths = std::env::var_os(MATERIAL_PATH_ENV)
            .map(|value| std::env::split_paths(&value).collect::<Vec<_>>())
            .unwrap_or_default();
        Self::new(paths)
    }

    /// Replace the parse options. Fails on a tolerance that cannot be checked.
    pub fn with_options(mut self, options: ParseOptions) -> Result<Self> {
        options.check()?;
        self.options = options;
        Ok(self)
    }

    /// Make the records of a compressed bundle resolvable by their keys.
    pub fn with_bundle(mut self, compressed: &[u8]) -> Result<Self> {
        let bundle = decode_bundle(compressed, &self.options)?;
        for entry in bundle.entries {
            self.bundled.insert(entry.key, Arc::new(entry.record));
        }
        Ok(self)
    }

    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Look up a material by name, parsing it on first use.
    pub fn get(&self, name: &str) -> Result<Arc<MaterialRecord>> {
        if let Some(record) = self.cached(name) {
            return Ok(record);
        }
        if let Some(record) = self.bundled.get(name) {
            return Ok(Arc::clone(record));
        }

        let path = self
            .resolve_path(name)
            .ok_or_else(|| MaterialError::UnknownMaterial(name.to_string()))?;
        log::debug!("loading material '{name}' from {path:?}");
        let record = Arc::new(read_material(&path, &self.options)?);

        let mut cache = self
            .cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Another caller may have loaded it in the meantime; keep the first.
        let record = cache.entry(name.to_string()).or_insert(record);
        Ok(Arc::clone(record))
    }

    fn cached(&self, name: &str) -> Option<Arc<MaterialRecord>> {
        let cache = self
            .cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.get(name).cloned()
    }

    /// Find the file backing `name` without parsing it.
    pub fn resolve_path(&self, name: &str) -> Option<PathBuf> {
        let direct = Path::new(name);
        if direct.is_file() {
            return Some(direct.to_path_buf());
        }
        for dir in &self.search_paths {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        self.search_paths
            .iter()
            .find_map(|dir| find_case_insensitive(dir, name))
    }

    /// Every material name this library can resolve, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.bundled.keys().cloned().collect();
        for dir in &self.search_paths {
            names.extend(material_files(dir).into_iter().filter_map(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            }));
        }
        names.into_iter().collect()
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Regular, non-hidden files directly inside `dir`, sorted by path.
pub fn material_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !n.starts_with('.'))
        })
        .collect();
    files.sort();
    files
}

fn find_case_insensitive(dir: &Path, name: &str) -> Option<PathBuf> {
    material_files(dir).into_iter().find(|path| {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.eq_ignore_ascii_case(name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_library_is_shareable() {
        assert_send_sync::<MaterialLibrary>();
    }

    #[test]
    fn test_missing_dir_lists_nothing() {
        let lib = MaterialLibrary::new(["/definitely/not/a/dir"]);
        assert!(lib.names().is_empty());
        assert!(matches!(
            lib.get("water").unwrap_err(),
            MaterialError::UnknownMaterial(_)
        ));
    }
}
