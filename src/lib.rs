//! # Relationship Explorer: a reactive notebook engine
//!
//! A noise slider drives a small, explicit dependency graph:
//!
//! ```text
//! σ ─► sample (y = 2x + ε) ─► Pearson r ─► findings / callouts
//!              └────────────► scatter chart
//! ```
//!
//! Moving the slider recomputes exactly the cells downstream of σ, in
//! topological order, as one all-or-nothing pass. Cells that do not depend
//! on σ keep their cached output.
//!
//! ## Example Usage
//!
//! ```rust
//! use relationship_explorer::config::NotebookConfig;
//! use relationship_explorer::notebook::Notebook;
//!
//! let mut notebook = Notebook::new(NotebookConfig::default())?;
//! assert!((notebook.sigma() - 0.5).abs() < f64::EPSILON);
//!
//! notebook.set_sigma(0.0)?;
//! assert!((notebook.correlation() - 1.0).abs() < 1e-12);
//!
//! // outside the slider range: rejected before anything recomputes
//! assert!(notebook.set_sigma(3.0).is_err());
//! # Ok::<(), relationship_explorer::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod control;
pub mod error;
pub mod graph;
pub mod notebook;
pub mod render;
pub mod report;
pub mod sample;
pub mod stats;

pub use error::{Error, Result};
