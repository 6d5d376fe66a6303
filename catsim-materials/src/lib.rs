pub mod bundle;
pub mod elements;
pub mod error;
pub mod library;
pub mod options;
pub mod parser;
pub mod validate;
pub mod writer;

pub use bundle::decode_bundle;
pub use error::{FormatError, FormatErrorKind, MaterialError, OptionsError, Result};
pub use library::{MATERIAL_PATH_ENV, MaterialLibrary, material_files, read_material};
pub use options::{DEFAULT_FRACTION_TOLERANCE, ParseOptions, SumCheck, is_valid_tolerance};
pub use parser::{parse, parse_with};
pub use validate::validate;
pub use writer::{write_material, write_material_file, write_material_with};
pub use catsim_material_data;
pub use catsim_material_data::{BundleEntry, ElementFraction, MaterialBundle, MaterialRecord};
