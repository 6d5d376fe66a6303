use std::collections::HashSet;

use catsim_material_data::MaterialRecord;

use crate::elements::{MAX_ATOMIC_NUMBER, is_valid_atomic_number};
use crate::error::{FormatError, FormatErrorKind, OptionsError};
use crate::options::{ParseOptions, SumCheck, is_valid_tolerance};

/// Check a record that did not come straight from text, e.g. one decoded
/// from a bundle or assembled by hand.
pub fn validate(record: &MaterialRecord, options: &ParseOptions) -> Result<(), FormatError> {
    if record.elements.is_empty() {
        return Err(FormatError::new(
            FormatErrorKind::InvalidElementCount,
            None,
            "a material needs at least one element",
        ));
    }
    let mut seen = HashSet::with_capacity(record.elements.len());
    for element in &record.elements {
        check_atomic_number(element.atomic_number, None)?;
        check_fraction(element.mass_fraction, None)?;
        check_unique(&mut seen, element.atomic_number, None)?;
    }
    check_fraction_sum(&record.name, record.total_fraction(), options)?;
    check_density(record.density, None)
}

pub(crate) fn check_atomic_number(z: u16, line: Option<usize>) -> Result<(), FormatError> {
    if is_valid_atomic_number(z) {
        Ok(())
    } else {
        Err(FormatError::new(
            FormatErrorKind::InvalidAtomicNumber,
            line,
            format!("{z} is outside [1, {MAX_ATOMIC_NUMBER}]"),
        ))
    }
}

pub(crate) fn check_fraction(fraction: f64, line: Option<usize>) -> Result<(), FormatError> {
    if fraction.is_finite() && fraction > 0.0 && fraction <= 1.0 {
        Ok(())
    } else {
        Err(FormatError::new(
            FormatErrorKind::InvalidFraction,
            line,
            format!("{fraction} is outside (0, 1]"),
        ))
    }
}

pub(crate) fn check_unique(
    seen: &mut HashSet<u16>,
    z: u16,
    line: Option<usize>,
) -> Result<(), FormatError> {
    if seen.insert(z) {
        Ok(())
    } else {
        Err(FormatError::new(
            FormatErrorKind::DuplicateElement,
            line,
            format!("atomic number {z} listed more than once"),
        ))
    }
}

pub(crate) fn check_fraction_sum(
    name: &str,
    sum: f64,
    options: &ParseOptions,
) -> Result<(), FormatError> {
    if options.sum_check == SumCheck::Skip {
        return Ok(());
    }
    if !is_valid_tolerance(options.fraction_tolerance) {
        return Err(FormatError::new(
            FormatErrorKind::FractionSumMismatch,
            None,
            format!(
                "cannot check sum {sum}: {}",
                OptionsError::InvalidTolerance(options.fraction_tolerance)
            ),
        ));
    }
    let drift = (sum - 1.0).abs();
    if drift <= options.fraction_tolerance {
        return Ok(());
    }
    match options.sum_check {
        SumCheck::Warn => {
            log::warn!(
                "mass fractions of '{name}' sum to {sum}, off by {drift:.3e} (tolerance {})",
                options.fraction_tolerance
            );
            Ok(())
        }
        _ => Err(FormatError::new(
            FormatErrorKind::FractionSumMismatch,
            None,
            format!(
                "fractions sum to {sum}, tolerance is {}",
                options.fraction_tolerance
            ),
        )),
    }
}

pub(crate) fn check_density(density: f64, line: Option<usize>) -> Result<(), FormatError> {
    if density.is_finite() && density > 0.0 {
        Ok(())
    } else {
        Err(FormatError::new(
            FormatErrorKind::InvalidDensity,
            line,
            format!("density must be positive, got {density}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catsim_material_data::ElementFraction;

    fn record(elements: &[(u16, f64)], density: f64) -> MaterialRecord {
        MaterialRecord {
            name: "test".to_string(),
            density,
            elements: elements
                .iter()
                .map(|&(z, f)| ElementFraction::new(z, f))
                .collect(),
        }
    }

    #[test]
    fn test_valid_record() {
        let r = record(&[(1, 0.111898), (8, 0.888102)], 1.0);
        assert!(validate(&r, &ParseOptions::default()).is_ok());
    }

    #[test]
    fn test_rejects_z_zero() {
        let r = record(&[(0, 1.0)], 1.0);
        let err = validate(&r, &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::InvalidAtomicNumber);
        assert_eq!(err.line, None);
    }

    #[test]
    fn test_rejects_nan_fraction() {
        let r = record(&[(1, f64::NAN)], 1.0);
        let err = validate(&r, &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::InvalidFraction);
    }

    #[test]
    fn test_sum_modes() {
        let r = record(&[(1, 0.5), (8, 0.45)], 1.0);
        let strict = ParseOptions::default();
        assert_eq!(
            validate(&r, &strict).unwrap_err().kind,
            FormatErrorKind::FractionSumMismatch
        );
        assert!(validate(&r, &strict.with_sum_check(SumCheck::Warn)).is_ok());
        assert!(validate(&r, &strict.with_sum_check(SumCheck::Skip)).is_ok());
        assert!(validate(&r, &strict.with_tolerance(0.06)).is_ok());
    }

    #[test]
    fn test_rejects_empty_record_in_every_mode() {
        let r = record(&[], 1.0);
        for mode in [SumCheck::Strict, SumCheck::Warn, SumCheck::Skip] {
            let opts = ParseOptions::default().with_sum_check(mode);
            let err = validate(&r, &opts).unwrap_err();
            assert_eq!(err.kind, FormatErrorKind::InvalidElementCount);
        }
    }

    #[test]
    fn test_bad_tolerance_is_explained() {
        let r = record(&[(6, 1.0)], 1.0);
        let opts = ParseOptions::default().with_tolerance(f64::NAN);
        let err = validate(&r, &opts).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::FractionSumMismatch);
        assert!(err.details.contains("tolerance"), "{err}");
    }

    #[test]
    fn test_rejects_zero_density() {
        let r = record(&[(6, 1.0)], 0.0);
        let err = validate(&r, &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::InvalidDensity);
    }
}
