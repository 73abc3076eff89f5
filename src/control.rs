//! Parameter control surface
//!
//! A [`Slider`] owns the user-adjustable noise level. It is the only place a
//! new parameter value can enter the system, and it rejects out-of-range
//! values before anything downstream sees them.

use tracing::warn;

use crate::config::{SliderConfig, MAX_SLIDER_STEPS};
use crate::{Error, Result};

/// Values within this distance of a grid point count as on-grid.
const GRID_TOLERANCE: f64 = 1e-9;

/// Bounded, stepped scalar control.
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    label: String,
    start: f64,
    stop: f64,
    step: f64,
    value: f64,
}

impl Slider {
    /// Create a slider from its configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the bounds or step are inconsistent, or the
    /// initial value lies outside the bounds
    pub fn new(label: impl Into<String>, config: SliderConfig) -> Result<Self> {
        let SliderConfig {
            start,
            stop,
            step,
            initial,
        } = config;

        if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
            return Err(Error::Config("slider bounds must be finite".to_string()));
        }
        if stop <= start || step <= 0.0 {
            return Err(Error::Config(format!(
                "slider needs start < stop and step > 0 (got {start}..{stop} step {step})"
            )));
        }
        if (stop - start) / step > MAX_SLIDER_STEPS {
            return Err(Error::Config(format!(
                "slider step {step} exceeds {MAX_SLIDER_STEPS} steps over [{start}, {stop}]"
            )));
        }

        let mut slider = Self {
            label: label.into(),
            start,
            stop,
            step,
            value: start,
        };
        slider.value = slider
            .check(initial)
            .map_err(|e| Error::Config(e.to_string()))?;
        Ok(slider)
    }

    /// Label shown next to the control
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current value
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Lower bound (inclusive)
    #[must_use]
    pub const fn start(&self) -> f64 {
        self.start
    }

    /// Upper bound (inclusive)
    #[must_use]
    pub const fn stop(&self) -> f64 {
        self.stop
    }

    /// Step granularity
    #[must_use]
    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Validate a candidate value and snap it onto the step grid.
    ///
    /// Does not change the slider; use [`Slider::set`] for that.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if the value is NaN or outside
    /// `[start, stop]`
    pub fn check(&self, value: f64) -> Result<f64> {
        if value.is_nan() || value < self.start || value > self.stop {
            warn!(label = %self.label, value, "rejected out-of-range parameter");
            return Err(Error::InvalidParameter {
                name: self.label.clone(),
                value,
                min: self.start,
                max: self.stop,
            });
        }

        let index = ((value - self.start) / self.step).round();
        let snapped = self.grid_value(index);
        if (snapped - value).abs() <= GRID_TOLERANCE {
            // keep the caller's exact literal (0.3 rather than 0.30000000000000004)
            Ok(value)
        } else {
            Ok(snapped)
        }
    }

    /// Set a new value; returns the value actually stored after snapping.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if the value is rejected; the
    /// current value is left unchanged
    pub fn set(&mut self, value: f64) -> Result<f64> {
        self.value = self.check(value)?;
        Ok(self.value)
    }

    /// Every grid position from `start` to `stop`, inclusive.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn positions(&self) -> Vec<f64> {
        let count = ((self.stop - self.start) / self.step + GRID_TOLERANCE).floor() as usize;
        (0..=count).map(|i| self.grid_value(i as f64)).collect()
    }

    fn grid_value(&self, index: f64) -> f64 {
        // round to 12 decimals so 0.1 steps print and compare cleanly
        let raw = index.mul_add(self.step, self.start);
        ((raw * 1e12).round() / 1e12).min(self.stop)
    }
}
