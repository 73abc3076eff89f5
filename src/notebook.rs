//! The relationship-explorer notebook
//!
//! ```text
//!  intro                       (no inputs: computed once)
//!  sigma ──► data ──► correlation ──┬──► findings ◄── sigma
//!              │                    └──► callouts ◄── sigma
//!              └────► scatter
//! ```
//!
//! Every output lives in [`NotebookState`]; each cell reads its inputs from
//! that struct and writes only its own field.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ChartConfig, NotebookConfig};
use crate::control::Slider;
use crate::graph::{CellGraph, GraphBuilder, PassRecord};
use crate::render::chart::scatter_svg;
use crate::render::{self, CalloutKind, Frame, Output, Sink};
use crate::sample::{Sample, SampleGenerator};
use crate::stats::{pearson, Trend};
use crate::Result;

/// Static header cell
pub const INTRO: &str = "intro";
/// Noise parameter
pub const SIGMA: &str = "sigma";
/// Sample generation cell
pub const DATA: &str = "data";
/// Correlation cell
pub const CORRELATION: &str = "correlation";
/// Scatter chart cell
pub const SCATTER: &str = "scatter";
/// Findings text cell
pub const FINDINGS: &str = "findings";
/// Live callouts cell
pub const CALLOUTS: &str = "callouts";

/// Slider label
pub const SIGMA_LABEL: &str = "Noise level (σ)";

/// Every cell output of the notebook, as explicit fields.
#[derive(Debug, Clone, Default)]
pub struct NotebookState {
    /// Noise level (parameter)
    pub sigma: f64,
    /// Header markdown
    pub intro: String,
    /// Generated sample
    pub sample: Sample,
    /// Pearson r of the sample (`NaN` if undefined)
    pub correlation: f64,
    /// Qualitative strength of `correlation`
    pub trend: Trend,
    /// Scatter chart SVG
    pub scatter: String,
    /// Findings markdown
    pub findings: String,
    /// Live-value callouts
    pub callouts: Vec<(CalloutKind, String)>,
}

/// Serializable summary of the notebook after a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Noise level
    pub sigma: f64,
    /// Pearson r (`null` in JSON when undefined)
    #[serde(with = "nan_as_null")]
    pub correlation: f64,
    /// Strength label
    pub trend: Trend,
    /// Points in the sample
    pub sample_size: usize,
    /// Generator seed
    pub seed: u64,
    /// Last committed pass number
    pub pass: u64,
    /// Cells recomputed by that pass
    pub recomputed: Vec<String>,
}

/// One point of a σ sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Noise level
    pub sigma: f64,
    /// Pearson r at that level (`null` in JSON when undefined)
    #[serde(with = "nan_as_null")]
    pub correlation: f64,
    /// Strength label
    pub trend: Trend,
}

/// The `NaN` correlation sentinel travels as JSON `null`.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

fn build_graph(
    generator: SampleGenerator,
    chart: ChartConfig,
    sigma: f64,
) -> Result<CellGraph<NotebookState>> {
    let initial = NotebookState {
        sigma,
        ..NotebookState::default()
    };

    GraphBuilder::new()
        .cell(INTRO, &[], |s: &mut NotebookState| {
            s.intro = render::intro_markdown();
            Ok(())
        })
        .parameter(SIGMA)
        .cell(DATA, &[SIGMA], move |s: &mut NotebookState| {
            s.sample = generator.generate(s.sigma)?;
            Ok(())
        })
        .cell(CORRELATION, &[DATA], |s: &mut NotebookState| {
            s.correlation = pearson(s.sample.x(), s.sample.y());
            s.trend = Trend::classify(s.correlation);
            Ok(())
        })
        .cell(SCATTER, &[DATA], move |s: &mut NotebookState| {
            s.scatter = scatter_svg(&s.sample, &chart)?;
            Ok(())
        })
        .cell(FINDINGS, &[SIGMA, CORRELATION], |s: &mut NotebookState| {
            s.findings = render::findings_markdown(s.sigma, s.correlation);
            Ok(())
        })
        .cell(CALLOUTS, &[SIGMA, CORRELATION], |s: &mut NotebookState| {
            s.callouts = render::callouts(s.sigma, s.correlation);
            Ok(())
        })
        .build(initial)
}

/// Interactive notebook: a noise slider driving a reactive cell graph.
#[derive(Debug)]
pub struct Notebook {
    config: NotebookConfig,
    generator: SampleGenerator,
    slider: Slider,
    graph: CellGraph<NotebookState>,
}

impl Notebook {
    /// Validate the configuration, build the graph and run the first pass.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an invalid configuration, or the first
    /// cell failure of the initial pass
    pub fn new(config: NotebookConfig) -> Result<Self> {
        config.validate()?;
        let slider = Slider::new(SIGMA_LABEL, config.slider)?;
        let generator = SampleGenerator::new(config.sample_size, config.seed)?;
        let graph = build_graph(generator, config.chart, slider.value())?;

        info!(
            sigma = slider.value(),
            n = config.sample_size,
            seed = config.seed,
            "notebook ready"
        );
        Ok(Self {
            config,
            generator,
            slider,
            graph,
        })
    }

    /// Move the slider and propagate the change.
    ///
    /// Returns `None` when the (snapped) value equals the current one: no
    /// input changed, so nothing is recomputed.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidParameter` if the value is outside the slider range;
    ///   raised before any cell runs
    /// - `Error::CellFailed` if a cell fails; slider and state keep their
    ///   previous values
    pub fn set_sigma(&mut self, value: f64) -> Result<Option<PassRecord>> {
        let sigma = self.slider.check(value)?;
        if sigma.total_cmp(&self.slider.value()).is_eq() {
            debug!(sigma, "sigma unchanged, nothing to recompute");
            return Ok(None);
        }

        let pass = self.graph.update(SIGMA, |s| {
            s.sigma = sigma;
            Ok(())
        })?;
        self.slider.set(sigma)?;
        info!(sigma, r = self.correlation(), "sigma changed");
        Ok(Some(pass))
    }

    /// Current noise level
    #[must_use]
    pub const fn sigma(&self) -> f64 {
        self.graph.state().sigma
    }

    /// Current sample
    #[must_use]
    pub const fn sample(&self) -> &Sample {
        &self.graph.state().sample
    }

    /// Current Pearson r (`NaN` if undefined)
    #[must_use]
    pub const fn correlation(&self) -> f64 {
        self.graph.state().correlation
    }

    /// Current relationship strength
    #[must_use]
    pub const fn trend(&self) -> Trend {
        self.graph.state().trend
    }

    /// All cell outputs
    #[must_use]
    pub const fn state(&self) -> &NotebookState {
        self.graph.state()
    }

    /// Noise slider
    #[must_use]
    pub const fn slider(&self) -> &Slider {
        &self.slider
    }

    /// Underlying graph, for introspection
    #[must_use]
    pub const fn graph(&self) -> &CellGraph<NotebookState> {
        &self.graph
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &NotebookConfig {
        &self.config
    }

    /// Current outputs, in notebook order.
    #[must_use]
    pub fn frame(&self) -> Frame {
        let state = self.graph.state();
        let mut frame = Frame::new();
        frame.push(INTRO, Output::Markdown(state.intro.clone()));
        frame.push(
            SIGMA,
            Output::Markdown(format!(
                "### Controls\n{}: {:.1}",
                self.slider.label(),
                state.sigma
            )),
        );
        frame.push(SCATTER, Output::Svg(state.scatter.clone()));
        frame.push(FINDINGS, Output::Markdown(state.findings.clone()));
        frame.push(CALLOUTS, Output::Callouts(state.callouts.clone()));
        frame
    }

    /// Present the current outputs.
    ///
    /// # Errors
    ///
    /// Returns error if the sink fails
    pub fn display(&self, sink: &mut impl Sink) -> Result<()> {
        sink.present(&self.frame())
    }

    /// Summary of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let (pass, recomputed) = self
            .graph
            .last_pass()
            .map_or((0, Vec::new()), |p| (p.pass(), p.recomputed().to_vec()));
        Snapshot {
            sigma: self.sigma(),
            correlation: self.correlation(),
            trend: self.trend(),
            sample_size: self.sample().len(),
            seed: self.generator.seed(),
            pass,
            recomputed,
        }
    }

    /// Correlation at every slider position, computed off to the side.
    ///
    /// # Errors
    ///
    /// Returns error if sample generation fails
    pub fn sweep(&self) -> Result<Vec<SweepPoint>> {
        self.slider
            .positions()
            .into_iter()
            .map(|sigma| {
                let sample = self.generator.generate(sigma)?;
                let correlation = pearson(sample.x(), sample.y());
                Ok(SweepPoint {
                    sigma,
                    correlation,
                    trend: Trend::classify(correlation),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MemorySink;
    use crate::Error;

    fn notebook() -> Notebook {
        Notebook::new(NotebookConfig::default()).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let nb = notebook();
        assert!((nb.sigma() - 0.5).abs() < f64::EPSILON);
        assert_eq!(nb.sample().len(), 200);
        assert!(nb.correlation() > 0.5);
        assert!(nb.state().scatter.contains("<svg"));
        assert!(nb.state().findings.contains("σ = 0.5"));
        assert!(nb.state().intro.starts_with("# Interactive"));
    }

    #[test]
    fn test_order() {
        let nb = notebook();
        assert_eq!(
            nb.graph().order(),
            [INTRO, SIGMA, DATA, CORRELATION, SCATTER, FINDINGS, CALLOUTS]
        );
    }

    #[test]
    fn test_set_sigma_recomputes_dependents_only() {
        let mut nb = notebook();
        let pass = nb.set_sigma(1.0).unwrap().unwrap();
        assert_eq!(
            pass.recomputed(),
            [DATA, CORRELATION, SCATTER, FINDINGS, CALLOUTS]
        );
        assert!(!pass.ran(INTRO));
        assert_eq!(nb.graph().run_count(INTRO), Some(1));
        assert_eq!(nb.graph().run_count(DATA), Some(2));
    }

    #[test]
    fn test_same_value_is_noop() {
        let mut nb = notebook();
        assert!(nb.set_sigma(0.5).unwrap().is_none());
        // snaps onto the current grid point
        assert!(nb.set_sigma(0.52).unwrap().is_none());
        assert_eq!(nb.graph().run_count(DATA), Some(1));
    }

    #[test]
    fn test_out_of_range_rejected_before_recompute() {
        let mut nb = notebook();
        let before = nb.snapshot();
        assert!(matches!(
            nb.set_sigma(2.5),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(nb.set_sigma(-1.0).is_err());
        assert_eq!(nb.snapshot(), before);
        assert_eq!(nb.graph().run_count(DATA), Some(1));
        assert!((nb.slider().value() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_noise_perfect_correlation() {
        let mut nb = notebook();
        nb.set_sigma(0.0).unwrap();
        assert!((nb.correlation() - 1.0).abs() < 1e-12);
        assert_eq!(nb.trend(), Trend::Strong);
    }

    #[test]
    fn test_frame_and_display() {
        let nb = notebook();
        let mut sink = MemorySink::default();
        nb.display(&mut sink).unwrap();
        nb.display(&mut sink).unwrap();
        assert_eq!(sink.frames().len(), 2);
        assert_eq!(sink.frames()[0], sink.frames()[1]);
        assert_eq!(sink.last().unwrap().len(), 5);
    }

    #[test]
    fn test_snapshot() {
        let mut nb = notebook();
        nb.set_sigma(1.5).unwrap();
        let snap = nb.snapshot();
        assert!((snap.sigma - 1.5).abs() < f64::EPSILON);
        assert_eq!(snap.pass, 1);
        assert_eq!(snap.sample_size, 200);
        assert_eq!(snap.seed, 42);
        assert!(snap.recomputed.contains(&DATA.to_string()));
    }

    #[test]
    fn test_snapshot_json_round_trip_with_undefined_correlation() {
        let snap = Snapshot {
            sigma: 0.0,
            correlation: f64::NAN,
            trend: Trend::Undefined,
            sample_size: 2,
            seed: 1,
            pass: 0,
            recomputed: vec![DATA.to_string()],
        };
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"correlation\":null"));

        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert!(back.correlation.is_nan());
        assert_eq!(back.trend, Trend::Undefined);
        assert_eq!(back.recomputed, snap.recomputed);
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let snap = notebook().snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert!((back.correlation - snap.correlation).abs() < 1e-12);
        assert_eq!(back.trend, snap.trend);
        assert_eq!(back.recomputed, snap.recomputed);

        let points = notebook().sweep().unwrap();
        let json = serde_json::to_string(&points).unwrap();
        let back: Vec<SweepPoint> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), points.len());
        for (b, p) in back.iter().zip(&points) {
            assert!((b.correlation - p.correlation).abs() < 1e-12);
            assert_eq!(b.trend, p.trend);
        }
    }

    #[test]
    fn test_sweep_does_not_touch_state() {
        let nb = notebook();
        let points = nb.sweep().unwrap();
        assert_eq!(points.len(), 21);
        assert!((points[0].correlation - 1.0).abs() < 1e-12);
        assert!(points[20].correlation < points[0].correlation);
        assert_eq!(nb.graph().run_count(DATA), Some(1));
    }

    #[test]
    fn test_sweep_matches_live_value() {
        let mut nb = notebook();
        nb.set_sigma(0.7).unwrap();
        let live = nb.correlation();
        let swept = nb
            .sweep()
            .unwrap()
            .into_iter()
            .find(|p| (p.sigma - 0.7).abs() < 1e-9)
            .unwrap();
        assert!((swept.correlation - live).abs() < 1e-12);
    }
}
