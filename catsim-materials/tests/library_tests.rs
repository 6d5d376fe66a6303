use std::path::PathBuf;
use std::sync::Arc;

use approx::assert_relative_eq;
use catsim_materials::{
    BundleEntry, ElementFraction, FormatErrorKind, MaterialBundle, MaterialError,
    MaterialLibrary, MaterialRecord, ParseOptions, SumCheck, decode_bundle, read_material,
};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

fn pack(bundle: &MaterialBundle) -> Vec<u8> {
    let bytes = postcard::to_allocvec(bundle).unwrap();
    zstd::encode_all(&bytes[..], 3).unwrap()
}

fn drifting_record() -> MaterialRecord {
    MaterialRecord {
        name: "legacy".to_string(),
        density: 2.5,
        elements: vec![
            ElementFraction::new(14, 0.46),
            ElementFraction::new(8, 0.52),
        ],
    }
}

#[test]
fn test_get_by_exact_name() {
    let lib = MaterialLibrary::new([data_dir()]);
    let water = lib.get("water").unwrap();
    assert_eq!(water.name, "water");
    assert_relative_eq!(water.density, 1.0);
    assert_eq!(water.mass_fraction(8), Some(0.888102));
}

#[test]
fn test_get_case_insensitive() {
    let lib = MaterialLibrary::new([data_dir()]);
    let adipose = lib.get("cirs_ADIPOSE_adult3").unwrap();
    assert_eq!(adipose.name, "CIRS_adipose_adult3");
    assert_eq!(adipose.element_count(), 6);
}

#[test]
fn test_get_by_direct_path() {
    let lib = MaterialLibrary::new(Vec::<PathBuf>::new());
    let path = data_dir().join("air");
    let air = lib.get(path.to_str().unwrap()).unwrap();
    assert_eq!(air.name, "air");
}

#[test]
fn test_records_are_cached() {
    let lib = MaterialLibrary::new([data_dir()]);
    let a = lib.get("bone_cortical").unwrap();
    let b = lib.get("bone_cortical").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_unknown_material() {
    let lib = MaterialLibrary::new([data_dir()]);
    let err = lib.get("unobtainium").unwrap_err();
    assert!(matches!(err, MaterialError::UnknownMaterial(ref name) if name == "unobtainium"));
}

#[test]
fn test_names_lists_fixtures() {
    let lib = MaterialLibrary::new([data_dir()]);
    let names = lib.names();
    for expected in ["CIRS_adipose_adult3", "air", "bone_cortical", "water"] {
        assert!(names.iter().any(|n| n == expected), "{expected} in {names:?}");
    }
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn test_concurrent_lookups_share_one_record() {
    let lib = MaterialLibrary::new([data_dir()]);
    let records: Vec<Arc<MaterialRecord>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(|| lib.get("water").unwrap())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    let cached = lib.get("water").unwrap();
    for record in &records {
        assert_eq!(**record, *cached);
    }
}

#[test]
fn test_read_material_reports_path() {
    let path = data_dir().join("does_not_exist");
    let err = read_material(&path, &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, MaterialError::Io { .. }));
    assert!(err.to_string().contains("does_not_exist"));
}

#[test]
fn test_bundle_lookup() {
    let water = read_material(data_dir().join("water"), &ParseOptions::default()).unwrap();
    let bundle = MaterialBundle {
        version: "test".to_string(),
        entries: vec![BundleEntry {
            key: "bundled_water".to_string(),
            record: water.clone(),
        }],
    };
    let lib = MaterialLibrary::new(Vec::<PathBuf>::new())
        .with_bundle(&pack(&bundle))
        .unwrap();
    assert_eq!(*lib.get("bundled_water").unwrap(), water);
    assert_eq!(lib.names(), vec!["bundled_water".to_string()]);
}

#[test]
fn test_bundle_revalidates_entries() {
    let bundle = MaterialBundle {
        version: "test".to_string(),
        entries: vec![BundleEntry {
            key: "legacy".to_string(),
            record: drifting_record(),
        }],
    };
    let bytes = pack(&bundle);

    let err = decode_bundle(&bytes, &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, MaterialError::Bundle(ref msg) if msg.contains("legacy")));

    let warn = ParseOptions::default().with_sum_check(SumCheck::Warn);
    let decoded = decode_bundle(&bytes, &warn).unwrap();
    assert_eq!(decoded, bundle);
}

#[test]
fn test_library_options_apply_to_files() {
    let tmp = tempfile::TempDir::new().unwrap();
    let dir = tmp.path();
    let skip = ParseOptions::default().with_sum_check(SumCheck::Skip);
    catsim_materials::write_material_file(dir.join("legacy"), &drifting_record(), &skip).unwrap();

    let strict = MaterialLibrary::new([dir]);
    let err = strict.get("legacy").unwrap_err();
    assert_eq!(
        err.format_error().map(|e| e.kind),
        Some(FormatErrorKind::FractionSumMismatch)
    );

    let lenient = MaterialLibrary::new([dir]).with_options(skip).unwrap();
    assert_eq!(lenient.get("legacy").unwrap().element_count(), 2);
}

#[test]
fn test_library_rejects_unusable_tolerance() {
    for tolerance in [f64::NAN, -0.5, f64::INFINITY] {
        let options = ParseOptions::default().with_tolerance(tolerance);
        let err = MaterialLibrary::new([data_dir()])
            .with_options(options)
            .err()
            .unwrap();
        assert!(matches!(err, MaterialError::Options(_)));
        assert!(matches!(
            decode_bundle(&[], &options).unwrap_err(),
            MaterialError::Options(_)
        ));
    }
}
