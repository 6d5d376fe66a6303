//! Kept in its own test binary: it mutates the process environment.

use std::path::PathBuf;

use catsim_materials::{MATERIAL_PATH_ENV, MaterialError, MaterialLibrary};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

#[test]
fn test_from_env_reads_search_path() {
    let empty = tempfile::TempDir::new().unwrap();
    let joined = std::env::join_paths([empty.path().to_path_buf(), data_dir()]).unwrap();
    // SAFETY: this is the only test in the binary, so no other thread reads
    // the environment concurrently.
    unsafe { std::env::set_var(MATERIAL_PATH_ENV, &joined) };

    let lib = MaterialLibrary::from_env();
    assert_eq!(lib.search_paths(), &[empty.path().to_path_buf(), data_dir()]);
    assert_eq!(lib.get("water").unwrap().name, "water");
    assert!(lib.names().contains(&"air".to_string()));

    unsafe { std::env::remove_var(MATERIAL_PATH_ENV) };
    let lib = MaterialLibrary::default();
    assert!(lib.search_paths().is_empty());
    assert!(matches!(
        lib.get("water").unwrap_err(),
        MaterialError::UnknownMaterial(_)
    ));
}
