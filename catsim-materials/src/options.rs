use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// How the fraction-sum check reacts to drift beyond the tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SumCheck {
    /// Reject the file.
    #[default]
    Strict,
    /// Log a warning and accept the file.
    Warn,
    Skip,
}

impl std::str::FromStr for SumCheck {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "warn" => Ok(Self::Warn),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown sum check mode: {other}")),
        }
    }
}

/// Knobs for parsing and validating material records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Allowed absolute distance of the fraction sum from 1.0.
    pub fraction_tolerance: f64,
    pub sum_check: SumCheck,
}

pub const DEFAULT_FRACTION_TOLERANCE: f64 = 0.01;

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            fraction_tolerance: DEFAULT_FRACTION_TOLERANCE,
            sum_check: SumCheck::Strict,
        }
    }
}

impl ParseOptions {
    /// Options with the tolerance checked up front.
    pub fn try_new(fraction_tolerance: f64, sum_check: SumCheck) -> Result<Self, OptionsError> {
        let options = Self {
            fraction_tolerance,
            sum_check,
        };
        options.check()?;
        Ok(options)
    }

    /// The tolerance must be finite and non-negative.
    pub fn check(&self) -> Result<(), OptionsError> {
        if is_valid_tolerance(self.fraction_tolerance) {
            Ok(())
        } else {
            Err(OptionsError::InvalidTolerance(self.fraction_tolerance))
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.fraction_tolerance = tolerance;
        self
    }

    pub fn with_sum_check(mut self, sum_check: SumCheck) -> Self {
        self.sum_check = sum_check;
        self
    }
}

pub fn is_valid_tolerance(tolerance: f64) -> bool {
    tolerance.is_finite() && tolerance >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_check_from_str() {
        assert_eq!("WARN".parse::<SumCheck>().unwrap(), SumCheck::Warn);
        assert_eq!("skip".parse::<SumCheck>().unwrap(), SumCheck::Skip);
        assert!("loose".parse::<SumCheck>().is_err());
    }

    #[test]
    fn test_builder() {
        let opts = ParseOptions::default()
            .with_tolerance(1e-3)
            .with_sum_check(SumCheck::Warn);
        assert_eq!(opts.fraction_tolerance, 1e-3);
        assert_eq!(opts.sum_check, SumCheck::Warn);
    }

    #[test]
    fn test_try_new_rejects_bad_tolerance() {
        for bad in [f64::NAN, f64::INFINITY, -0.01] {
            let err = ParseOptions::try_new(bad, SumCheck::Strict).unwrap_err();
            assert!(matches!(err, OptionsError::InvalidTolerance(_)));
        }
        let ok = ParseOptions::try_new(0.0, SumCheck::Warn).unwrap();
        assert_eq!(ok.fraction_tolerance, 0.0);
        assert!(ParseOptions::default().with_tolerance(f64::NAN).check().is_err());
    }
}
