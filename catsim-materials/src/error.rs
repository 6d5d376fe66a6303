use std::fmt;
use std::path::PathBuf;

/// What went wrong while reading a material file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatErrorKind {
    MissingSection,
    DuplicateSection,
    MissingValue,
    InvalidElementCount,
    MissingRows,
    ExtraRows,
    InvalidAtomicNumber,
    InvalidFraction,
    DuplicateElement,
    FractionSumMismatch,
    InvalidDensity,
    UnexpectedLine,
}

impl fmt::Display for FormatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MissingSection => "missing section",
            Self::DuplicateSection => "duplicate section",
            Self::MissingValue => "missing value",
            Self::InvalidElementCount => "invalid element count",
            Self::MissingRows => "missing element rows",
            Self::ExtraRows => "extra element rows",
            Self::InvalidAtomicNumber => "invalid atomic number",
            Self::InvalidFraction => "invalid mass fraction",
            Self::DuplicateElement => "duplicate element",
            Self::FractionSumMismatch => "mass fractions do not sum to 1",
            Self::InvalidDensity => "invalid density",
            Self::UnexpectedLine => "unexpected line",
        };
        f.write_str(s)
    }
}

/// A malformed material file. No partial record survives one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatError {
    pub kind: FormatErrorKind,
    /// 1-based line the problem was found on, when there is one.
    pub line: Option<usize>,
    pub details: String,
}

impl FormatError {
    pub fn new(kind: FormatErrorKind, line: Option<usize>, details: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            details: details.into(),
        }
    }

    pub fn at(kind: FormatErrorKind, line: usize, details: impl Into<String>) -> Self {
        Self::new(kind, Some(line), details)
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} (line {line}): {}", self.kind, self.details),
            None => write!(f, "{}: {}", self.kind, self.details),
        }
    }
}

impl std::error::Error for FormatError {}

/// Parse options that cannot be applied.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum OptionsError {
    #[error("fraction tolerance must be a finite, non-negative number, got {0}")]
    InvalidTolerance(f64),
}

#[derive(Debug, thiserror::Error)]
pub enum MaterialError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed material file {path:?}: {source}")]
    Format { path: PathBuf, source: FormatError },

    #[error(transparent)]
    Parse(#[from] FormatError),

    #[error("unknown material: {0}")]
    UnknownMaterial(String),

    #[error("invalid material bundle: {0}")]
    Bundle(String),

    #[error(transparent)]
    Options(#[from] OptionsError),
}

impl MaterialError {
    /// The underlying format error, if this failure came from file content.
    pub fn format_error(&self) -> Option<&FormatError> {
        match self {
            Self::Format { source, .. } | Self::Parse(source) => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MaterialError>;
