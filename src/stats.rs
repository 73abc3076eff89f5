//! Summary statistics over generated samples
//!
//! Pearson correlation uses the two-pass (mean-centred) formulation, which
//! avoids the cancellation of the `E[XY] − E[X]E[Y]` shortcut.
//!
//! Degenerate inputs have two entry points:
//! - [`try_pearson`] reports them as errors
//! - [`pearson`] returns `NaN` as a defined sentinel and never fails

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Arithmetic mean; `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample variance (denominator `n − 1`); `None` when fewer than 2 values.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn variance(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let m = mean(data)?;
    let ss: f64 = data.iter().map(|v| (v - m) * (v - m)).sum();
    Some(ss / (data.len() - 1) as f64)
}

/// Pearson correlation coefficient of two equal-length sequences.
///
/// # Errors
///
/// - `Error::LengthMismatch` if the sequences differ in length
/// - `Error::DegenerateSample` if there are fewer than 2 points, a value is
///   not finite, or either sequence has zero variance
///
/// # Example
///
/// ```rust
/// use relationship_explorer::stats::try_pearson;
///
/// let x = [1.0, 2.0, 3.0, 4.0];
/// let y = [2.0, 4.0, 6.0, 8.0];
/// assert!((try_pearson(&x, &y)? - 1.0).abs() < 1e-12);
/// # Ok::<(), relationship_explorer::Error>(())
/// ```
pub fn try_pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(Error::LengthMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(Error::DegenerateSample(format!(
            "need at least 2 points, got {}",
            x.len()
        )));
    }
    if !x.iter().chain(y).all(|v| v.is_finite()) {
        return Err(Error::DegenerateSample(
            "sample contains non-finite values".to_string(),
        ));
    }

    if is_constant(x) || is_constant(y) {
        return Err(Error::DegenerateSample(
            "zero variance in one of the sequences".to_string(),
        ));
    }

    // Both means exist: length checked above
    let mx = mean(x).unwrap_or_default();
    let my = mean(y).unwrap_or_default();

    let (mut sxy, mut sxx, mut syy) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        sxy = dx.mul_add(dy, sxy);
        sxx = dx.mul_add(dx, sxx);
        syy = dy.mul_add(dy, syy);
    }

    if sxx == 0.0 || syy == 0.0 {
        return Err(Error::DegenerateSample(
            "zero variance in one of the sequences".to_string(),
        ));
    }

    // Rounding can push |r| a hair past 1 for exactly linear data
    Ok((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

fn is_constant(values: &[f64]) -> bool {
    values
        .split_first()
        .map_or(true, |(first, rest)| rest.iter().all(|v| v.total_cmp(first).is_eq()))
}

/// Pearson correlation with `NaN` as the sentinel for degenerate input.
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    try_pearson(x, y).unwrap_or(f64::NAN)
}

/// Qualitative strength of a linear relationship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// `|r| > 0.8`
    Strong,
    /// `0.5 < |r| <= 0.8`
    Moderate,
    /// `0.3 < |r| <= 0.5`
    Weak,
    /// `|r| <= 0.3`
    VeryWeak,
    /// Correlation undefined (`NaN`)
    #[default]
    Undefined,
}

impl Trend {
    /// Classify a correlation coefficient.
    #[must_use]
    pub fn classify(r: f64) -> Self {
        let magnitude = r.abs();
        if r.is_nan() {
            Self::Undefined
        } else if magnitude > 0.8 {
            Self::Strong
        } else if magnitude > 0.5 {
            Self::Moderate
        } else if magnitude > 0.3 {
            Self::Weak
        } else {
            Self::VeryWeak
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
            Self::VeryWeak => "very weak",
            Self::Undefined => "undefined",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
