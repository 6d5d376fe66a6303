//! Reader for the material file layout emitted by the material calculator:
//!
//! ```text
//! # Material name:
//! # water
//! # Number of elements:
//! 2
//! # Density:
//! 1.000000
//! # Atomic number(s) and corresponding mass fraction(s):
//! 1 0.111898 # Hydrogen
//! 8 0.888102 # Oxygen
//! ```
//!
//! Sections are introduced by comment labels and may come in any order.

use std::collections::HashSet;

use catsim_material_data::{ElementFraction, MaterialRecord};

use crate::error::{FormatError, FormatErrorKind};
use crate::options::ParseOptions;
use crate::validate::{
    check_atomic_number, check_density, check_fraction, check_fraction_sum, check_unique,
};

pub const NAME_LABEL: &str = "Material name:";
pub const COUNT_LABEL: &str = "Number of elements:";
pub const DENSITY_LABEL: &str = "Density:";
pub const ROWS_LABEL: &str = "Atomic number(s) and corresponding mass fraction(s):";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Name,
    Count,
    Density,
    Rows,
}

impl Section {
    fn from_label(text: &str) -> Option<Self> {
        match text {
            NAME_LABEL => Some(Self::Name),
            COUNT_LABEL => Some(Self::Count),
            DENSITY_LABEL => Some(Self::Density),
            ROWS_LABEL => Some(Self::Rows),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Name => NAME_LABEL,
            Self::Count => COUNT_LABEL,
            Self::Density => DENSITY_LABEL,
            Self::Rows => ROWS_LABEL,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    text: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Nothing,
    Name,
    Count,
    Density,
    Rows,
}

impl Expect {
    /// Section whose single value line has not been seen yet.
    fn pending(self) -> Option<Section> {
        match self {
            Self::Name => Some(Section::Name),
            Self::Count => Some(Section::Count),
            Self::Density => Some(Section::Density),
            Self::Nothing | Self::Rows => None,
        }
    }
}

#[derive(Debug, Default)]
struct Layout<'a> {
    name: Option<String>,
    count: Option<Line<'a>>,
    density: Option<Line<'a>>,
    rows_label: Option<usize>,
    rows: Vec<Line<'a>>,
    labels_seen: Vec<(Section, usize)>,
}

/// Parse a material file with the default options.
pub fn parse(text: &str) -> Result<MaterialRecord, FormatError> {
    parse_with(text, &ParseOptions::default())
}

/// Parse and validate a material file.
///
/// Checks run in a fixed order and the first violation is returned.
pub fn parse_with(text: &str, options: &ParseOptions) -> Result<MaterialRecord, FormatError> {
    let layout = scan(text)?;

    let count_line = require(layout.count, Section::Count)?;
    let density_line = require(layout.density, Section::Density)?;
    let rows_label = layout
        .rows_label
        .ok_or_else(|| missing_section(Section::Rows))?;

    let declared = parse_count(count_line)?;
    check_row_count(declared, rows_label, &layout.rows)?;

    let mut seen = HashSet::with_capacity(declared);
    let mut elements = Vec::with_capacity(declared);
    for row in &layout.rows {
        let element = parse_row(*row)?;
        check_unique(&mut seen, element.atomic_number, Some(row.number))?;
        elements.push(element);
    }

    let name = layout.name.unwrap_or_default();
    let total: f64 = elements.iter().map(|e| e.mass_fraction).sum();
    check_fraction_sum(&name, total, options)?;

    let density = parse_density(density_line)?;

    Ok(MaterialRecord {
        name,
        density,
        elements,
    })
}

fn scan(text: &str) -> Result<Layout<'_>, FormatError> {
    let mut layout = Layout::default();
    let mut expect = Expect::Nothing;

    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    for (idx, raw) in text.lines().enumerate() {
        let number = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(comment) = trimmed.strip_prefix('#') {
            let comment = comment.trim();
            if let Some(section) = Section::from_label(comment) {
                if let Some(pending) = expect.pending() {
                    return Err(missing_value(pending, number));
                }
                let previous = layout.labels_seen.iter().find(|(s, _)| *s == section);
                if let Some(&(_, first)) = previous {
                    return Err(FormatError::at(
                        FormatErrorKind::DuplicateSection,
                        number,
                        format!("'# {}' already appeared on line {first}", section.label()),
                    ));
                }
                layout.labels_seen.push((section, number));
                expect = match section {
                    Section::Name => Expect::Name,
                    Section::Count => Expect::Count,
                    Section::Density => Expect::Density,
                    Section::Rows => {
                        layout.rows_label = Some(number);
                        Expect::Rows
                    }
                };
                continue;
            }

            match expect {
                Expect::Name => {
                    layout.name = Some(comment.to_string());
                    expect = Expect::Nothing;
                }
                Expect::Count => return Err(missing_value(Section::Count, number)),
                Expect::Density => return Err(missing_value(Section::Density, number)),
                Expect::Nothing | Expect::Rows => {}
            }
            continue;
        }

        let line = Line {
            number,
            text: trimmed,
        };
        match expect {
            Expect::Name => {
                layout.name = Some(trimmed.to_string());
                expect = Expect::Nothing;
            }
            Expect::Count => {
                layout.count = Some(line);
                expect = Expect::Nothing;
            }
            Expect::Density => {
                layout.density = Some(line);
                expect = Expect::Nothing;
            }
            Expect::Rows => layout.rows.push(line),
            Expect::Nothing => {
                return Err(FormatError::at(
                    FormatErrorKind::UnexpectedLine,
                    number,
                    format!("'{trimmed}' is not under any section label"),
                ));
            }
        }
    }

    if let Some(pending) = expect.pending() {
        let number = text.lines().count();
        return Err(missing_value(pending, number));
    }

    Ok(layout)
}

fn require<'a>(line: Option<Line<'a>>, section: Section) -> Result<Line<'a>, FormatError> {
    line.ok_or_else(|| missing_section(section))
}

fn missing_section(section: Section) -> FormatError {
    FormatError::new(
        FormatErrorKind::MissingSection,
        None,
        format!("no '# {}' label", section.label()),
    )
}

fn missing_value(section: Section, number: usize) -> FormatError {
    FormatError::at(
        FormatErrorKind::MissingValue,
        number,
        format!("'# {}' is not followed by a value", section.label()),
    )
}

/// Data part of a line, with any trailing `# ...` comment removed.
fn data_part(text: &str) -> &str {
    text.split_once('#').map_or(text, |(data, _)| data).trim()
}

fn single_token(line: Line<'_>) -> Option<&str> {
    let mut tokens = data_part(line.text).split_whitespace();
    let token = tokens.next()?;
    tokens.next().is_none().then_some(token)
}

fn parse_count(line: Line<'_>) -> Result<usize, FormatError> {
    single_token(line)
        .and_then(|tok| tok.parse::<usize>().ok())
        .filter(|&k| k > 0)
        .ok_or_else(|| {
            FormatError::at(
                FormatErrorKind::InvalidElementCount,
                line.number,
                format!("expected a positive integer, got '{}'", line.text),
            )
        })
}

fn parse_density(line: Line<'_>) -> Result<f64, FormatError> {
    let density = single_token(line)
        .and_then(|tok| tok.parse::<f64>().ok())
        .ok_or_else(|| {
            FormatError::at(
                FormatErrorKind::InvalidDensity,
                line.number,
                format!("expected a number, got '{}'", line.text),
            )
        })?;
    check_density(density, Some(line.number))?;
    Ok(density)
}

fn check_row_count(
    declared: usize,
    label_line: usize,
    rows: &[Line<'_>],
) -> Result<(), FormatError> {
    if rows.len() < declared {
        let number = rows.last().map_or(label_line, |row| row.number);
        return Err(FormatError::at(
            FormatErrorKind::MissingRows,
            number,
            format!("expected {declared} element rows, found {}", rows.len()),
        ));
    }
    if rows.len() > declared {
        return Err(FormatError::at(
            FormatErrorKind::ExtraRows,
            rows[declared].number,
            format!("expected {declared} element rows, found {}", rows.len()),
        ));
    }
    Ok(())
}

fn parse_row(line: Line<'_>) -> Result<ElementFraction, FormatError> {
    let mut tokens = data_part(line.text).split_whitespace();

    let z_token = tokens.next().unwrap_or_default();
    let atomic_number = z_token.parse::<u16>().map_err(|_| {
        FormatError::at(
            FormatErrorKind::InvalidAtomicNumber,
            line.number,
            format!("'{z_token}' is not an atomic number"),
        )
    })?;
    check_atomic_number(atomic_number, Some(line.number))?;

    let fraction_token = tokens.next().ok_or_else(|| {
        FormatError::at(
            FormatErrorKind::InvalidFraction,
            line.number,
            format!("no mass fraction after atomic number {atomic_number}"),
        )
    })?;
    let mass_fraction = fraction_token.parse::<f64>().map_err(|_| {
        FormatError::at(
            FormatErrorKind::InvalidFraction,
            line.number,
            format!("'{fraction_token}' is not a number"),
        )
    })?;
    check_fraction(mass_fraction, Some(line.number))?;

    if let Some(extra) = tokens.next() {
        return Err(FormatError::at(
            FormatErrorKind::UnexpectedLine,
            line.number,
            format!("unexpected '{extra}' after the mass fraction"),
        ));
    }

    Ok(ElementFraction::new(atomic_number, mass_fraction))
}
