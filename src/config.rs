//! Notebook configuration
//!
//! All fields have defaults matching the reference notebook (n = 200,
//! seed = 42, σ slider over `[0.0, 2.0]` in steps of `0.1` starting at `0.5`),
//! so a partial JSON document is enough to override a single knob.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default number of generated points
pub const DEFAULT_SAMPLE_SIZE: usize = 200;

/// Default generator seed
pub const DEFAULT_SEED: u64 = 42;

/// Upper bound on the number of slider steps between `start` and `stop`.
pub const MAX_SLIDER_STEPS: f64 = 10_000.0;

/// Slider bounds, step and initial position for the noise parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderConfig {
    /// Lower bound (inclusive)
    pub start: f64,
    /// Upper bound (inclusive)
    pub stop: f64,
    /// Step granularity
    pub step: f64,
    /// Initial value
    pub initial: f64,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            start: 0.0,
            stop: 2.0,
            step: 0.1,
            initial: 0.5,
        }
    }
}

/// Chart dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        // 5 x 3.2 inches at 120 dpi
        Self {
            width: 600,
            height: 384,
        }
    }
}

/// Top-level notebook configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotebookConfig {
    /// Points per generated sample
    pub sample_size: usize,
    /// Seed for the deterministic generator
    pub seed: u64,
    /// Noise slider
    pub slider: SliderConfig,
    /// Scatter chart size
    pub chart: ChartConfig,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: DEFAULT_SEED,
            slider: SliderConfig::default(),
            chart: ChartConfig::default(),
        }
    }
}

impl NotebookConfig {
    /// Parse a (possibly partial) JSON configuration and validate it.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or the values are inconsistent
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the sample size
    #[must_use]
    pub const fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Set the generator seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the slider configuration
    #[must_use]
    pub const fn with_slider(mut self, slider: SliderConfig) -> Self {
        self.slider = slider;
        self
    }

    /// Set the chart dimensions
    #[must_use]
    pub const fn with_chart(mut self, width: u32, height: u32) -> Self {
        self.chart = ChartConfig { width, height };
        self
    }

    /// Check the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        if self.sample_size < 2 {
            return Err(Error::Config(format!(
                "sample_size must be at least 2 (got {})",
                self.sample_size
            )));
        }

        let s = &self.slider;
        if ![s.start, s.stop, s.step, s.initial].iter().all(|v| v.is_finite()) {
            return Err(Error::Config("slider values must be finite".to_string()));
        }
        if s.start < 0.0 {
            return Err(Error::Config(format!(
                "slider.start must be >= 0 (noise scale), got {}",
                s.start
            )));
        }
        if s.stop <= s.start {
            return Err(Error::Config(format!(
                "slider.stop ({}) must be greater than slider.start ({})",
                s.stop, s.start
            )));
        }
        if s.step <= 0.0 || s.step > s.stop - s.start {
            return Err(Error::Config(format!(
                "slider.step must be in (0, {}], got {}",
                s.stop - s.start,
                s.step
            )));
        }
        if (s.stop - s.start) / s.step > MAX_SLIDER_STEPS {
            return Err(Error::Config(format!(
                "slider.step {} gives more than {MAX_SLIDER_STEPS} steps over [{}, {}]",
                s.step, s.start, s.stop
            )));
        }
        if s.initial < s.start || s.initial > s.stop {
            return Err(Error::Config(format!(
                "slider.initial ({}) must lie within [{}, {}]",
                s.initial, s.start, s.stop
            )));
        }

        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(Error::Config("chart dimensions must be non-zero".to_string()));
        }

        Ok(())
    }
}
