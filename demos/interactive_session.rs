//! Interactive Session: moving the noise slider
//!
//! Builds the notebook with its defaults (n = 200, seed = 42, σ = 0.5), then
//! drags the slider across a few positions. After each change it prints which
//! cells the pass recomputed and the resulting correlation.
//!
//! Run with: cargo run --example interactive_session

use relationship_explorer::config::NotebookConfig;
use relationship_explorer::notebook::{Notebook, INTRO};
use relationship_explorer::render::TextSink;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Relationship Explorer: Interactive Session ===\n");

    let mut notebook = Notebook::new(NotebookConfig::default())?;
    let mut sink = TextSink::new(std::io::stdout().lock());
    notebook.display(&mut sink)?;

    println!("Evaluation order: {}", notebook.graph().order().join(" → "));
    println!();

    for sigma in [0.0, 0.5, 1.0, 1.5, 2.0] {
        match notebook.set_sigma(sigma)? {
            Some(pass) => println!(
                "σ = {:.1}  r = {:.3}  ({})  recomputed: {}",
                notebook.sigma(),
                notebook.correlation(),
                notebook.trend(),
                pass.recomputed().join(", ")
            ),
            None => println!("σ = {sigma:.1}  unchanged, nothing recomputed"),
        }
    }

    println!("\n=== Rejected input ===");
    match notebook.set_sigma(2.7) {
        Ok(_) => println!("unexpectedly accepted"),
        Err(e) => println!("{e}"),
    }
    println!(
        "σ still {:.1}; '{INTRO}' has run {} time(s)",
        notebook.sigma(),
        notebook.graph().run_count(INTRO).unwrap_or(0)
    );

    println!("\n=== Sweep ===");
    for point in notebook.sweep()? {
        println!("  σ = {:.1}  r = {:+.3}  {}", point.sigma, point.correlation, point.trend);
    }

    Ok(())
}
