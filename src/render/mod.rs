//! Presentation sink
//!
//! Rendering is split in two:
//! - pure formatting functions turn the latest values into [`Output`]s
//!   (same inputs, same output, every time)
//! - a [`Sink`] consumes a [`Frame`] of outputs and feeds nothing back
//!
//! ## Example
//!
//! ```rust
//! use relationship_explorer::render::{findings_markdown, Frame, MemorySink, Output, Sink};
//!
//! let mut frame = Frame::new();
//! frame.push("findings", Output::Markdown(findings_markdown(0.5, 0.83)));
//!
//! let mut sink = MemorySink::default();
//! sink.present(&frame)?;
//! assert_eq!(sink.frames().len(), 1);
//! # Ok::<(), relationship_explorer::Error>(())
//! ```

pub mod chart;

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::stats::Trend;
use crate::Result;

/// Kind of a callout box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalloutKind {
    /// Neutral information
    Info,
    /// Positive result
    Success,
}

/// One rendered output of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum Output {
    /// Markdown text
    Markdown(String),
    /// Short highlighted messages shown side by side
    Callouts(Vec<(CalloutKind, String)>),
    /// SVG document
    Svg(String),
}

/// Ordered, named outputs produced from one consistent state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    outputs: Vec<(String, Output)>,
}

impl Frame {
    /// Create an empty frame
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named output
    pub fn push(&mut self, name: impl Into<String>, output: Output) {
        self.outputs.push((name.into(), output));
    }

    /// Output by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Output> {
        self.outputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, output)| output)
    }

    /// All outputs in order
    #[must_use]
    pub fn outputs(&self) -> &[(String, Output)] {
        &self.outputs
    }

    /// Number of outputs
    #[must_use]
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// True if the frame has no outputs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Terminal consumer of rendered frames.
pub trait Sink {
    /// Present a frame.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying medium fails
    fn present(&mut self, frame: &Frame) -> Result<()>;
}

/// Keeps every presented frame in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    frames: Vec<Frame>,
}

impl MemorySink {
    /// Frames presented so far, oldest first
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Most recent frame
    #[must_use]
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl Sink for MemorySink {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

/// Writes frames as plain text. SVG payloads are summarized by size.
#[derive(Debug)]
pub struct TextSink<W: Write> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    /// Wrap a writer
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for TextSink<W> {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        for (name, output) in frame.outputs() {
            match output {
                Output::Markdown(text) => {
                    writeln!(self.writer, "{}", text.trim_end())?;
                }
                Output::Callouts(callouts) => {
                    let line = callouts
                        .iter()
                        .map(|(kind, text)| format!("[{}] {text}", callout_tag(*kind)))
                        .collect::<Vec<_>>()
                        .join("  ");
                    writeln!(self.writer, "{line}")?;
                }
                Output::Svg(svg) => {
                    writeln!(self.writer, "<{name}: svg chart, {} bytes>", svg.len())?;
                }
            }
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

const fn callout_tag(kind: CalloutKind) -> &'static str {
    match kind {
        CalloutKind::Info => "info",
        CalloutKind::Success => "success",
    }
}

/// Static notebook header. Depends on nothing.
#[must_use]
pub fn intro_markdown() -> String {
    "# Interactive data relationship notebook\n\n\
     Use the slider to control noise in a simple linear model and observe how \
     the scatter plot and correlation respond."
        .to_string()
}

/// Findings section for the current noise level and correlation.
#[must_use]
pub fn findings_markdown(sigma: f64, r: f64) -> String {
    let trend = Trend::classify(r);
    format!(
        "### Findings\n\
         - Current noise level **σ = {sigma:.1}**\n\
         - Pearson correlation **r = {r:.3}** → *{trend}* linear relationship\n\
         - As σ increases, points spread further from the line *y = 2x*, reducing |r|.\n"
    )
}

/// Live-value callouts.
#[must_use]
pub fn callouts(sigma: f64, r: f64) -> Vec<(CalloutKind, String)> {
    vec![
        (CalloutKind::Info, format!("Live widget value σ = {sigma:.1}")),
        (CalloutKind::Success, format!("Live correlation r = {r:.3}")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_findings_markdown() {
        let text = findings_markdown(0.5, 0.8312);
        assert!(text.contains("σ = 0.5"));
        assert!(text.contains("r = 0.831"));
        assert!(text.contains("*strong*"));
    }

    #[test]
    fn test_findings_nan() {
        let text = findings_markdown(0.0, f64::NAN);
        assert!(text.contains("r = NaN"));
        assert!(text.contains("*undefined*"));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        assert_eq!(findings_markdown(1.3, 0.42), findings_markdown(1.3, 0.42));
        assert_eq!(callouts(1.3, 0.42), callouts(1.3, 0.42));
    }

    #[test]
    fn test_callouts() {
        let boxes = callouts(0.5, 0.9);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].0, CalloutKind::Info);
        assert_eq!(boxes[1].1, "Live correlation r = 0.900");
    }

    #[test]
    fn test_frame_lookup() {
        let mut frame = Frame::new();
        assert!(frame.is_empty());
        frame.push("intro", Output::Markdown(intro_markdown()));
        frame.push("chart", Output::Svg("<svg/>".to_string()));
        assert_eq!(frame.len(), 2);
        assert!(matches!(frame.get("chart"), Some(Output::Svg(_))));
        assert!(frame.get("missing").is_none());
    }

    #[test]
    fn test_text_sink() {
        let mut frame = Frame::new();
        frame.push("findings", Output::Markdown(findings_markdown(0.5, 0.9)));
        frame.push("callouts", Output::Callouts(callouts(0.5, 0.9)));
        frame.push("scatter", Output::Svg("<svg></svg>".to_string()));

        let mut sink = TextSink::new(Vec::new());
        sink.present(&frame).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();

        assert!(text.contains("### Findings"));
        assert!(text.contains("[info] Live widget value σ = 0.5"));
        assert!(text.contains("<scatter: svg chart, 11 bytes>"));
    }

    #[test]
    fn test_output_serializes_tagged() {
        let json = serde_json::to_string(&Output::Markdown("hi".to_string())).unwrap();
        assert_eq!(json, r#"{"kind":"markdown","body":"hi"}"#);
    }
}
