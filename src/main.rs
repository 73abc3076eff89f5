//! Command-line front end for the relationship explorer.
//!
//! ```text
//! relationship-explorer explore --sigma 0.0 --sigma 1.2 [--json] [--svg-dir out/]
//! relationship-explorer sweep [--json]
//! relationship-explorer report --out employee_performance_analysis.html
//! ```
//!
//! Log verbosity follows `RUST_LOG`, or `--log-level` when given.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use relationship_explorer::config::NotebookConfig;
use relationship_explorer::notebook::Notebook;
use relationship_explorer::render::TextSink;
use relationship_explorer::report;

#[derive(Parser)]
#[command(name = "relationship-explorer")]
#[command(about = "Reactive notebook: noise level vs. correlation in y = 2x + ε")]
struct Cli {
    /// JSON configuration file (partial documents allowed)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "relationship_explorer=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply noise levels in order and show the notebook after each change
    Explore {
        /// Noise level to apply (repeatable)
        #[arg(long = "sigma", allow_negative_numbers = true)]
        sigmas: Vec<f64>,
        /// Print JSON snapshots instead of rendered text
        #[arg(long)]
        json: bool,
        /// Write the scatter chart after each change into this directory
        #[arg(long)]
        svg_dir: Option<PathBuf>,
    },
    /// Correlation at every slider position
    Sweep {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write the employee department HTML report
    Report {
        /// Output path
        #[arg(long, default_value = "employee_performance_analysis.html")]
        out: PathBuf,
    },
}

fn init_tracing(level: Option<&str>) {
    let filter = level
        .and_then(|l| EnvFilter::try_new(l).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<NotebookConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            NotebookConfig::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(NotebookConfig::default()),
    }
}

fn write_scatter(dir: &Path, notebook: &Notebook) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(format!("scatter_sigma_{:.1}.svg", notebook.sigma()));
    std::fs::write(&path, &notebook.state().scatter)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "scatter chart written");
    Ok(())
}

fn explore(
    config: NotebookConfig,
    sigmas: &[f64],
    json: bool,
    svg_dir: Option<&Path>,
) -> Result<()> {
    let mut notebook = Notebook::new(config)?;
    let mut sink = TextSink::new(std::io::stdout().lock());

    let mut emit = |notebook: &Notebook| -> Result<()> {
        if json {
            println!("{}", serde_json::to_string(&notebook.snapshot())?);
        } else {
            notebook.display(&mut sink)?;
        }
        if let Some(dir) = svg_dir {
            write_scatter(dir, notebook)?;
        }
        Ok(())
    };

    emit(&notebook)?;
    for &sigma in sigmas {
        match notebook.set_sigma(sigma)? {
            Some(_) => emit(&notebook)?,
            None => info!(sigma, "value unchanged, skipping"),
        }
    }
    Ok(())
}

fn sweep(config: NotebookConfig, json: bool) -> Result<()> {
    let notebook = Notebook::new(config)?;
    let points = notebook.sweep()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
    } else {
        println!("{:>6}  {:>7}  trend", "sigma", "r");
        for point in points {
            println!(
                "{:>6.1}  {:>7.3}  {}",
                point.sigma, point.correlation, point.trend
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Explore {
            sigmas,
            json,
            svg_dir,
        } => explore(config, &sigmas, json, svg_dir.as_deref()),
        Commands::Sweep { json } => sweep(config, json),
        Commands::Report { out } => {
            let hr_count = report::write_html_report(&out, &config.chart)?;
            println!("Frequency count of HR department: {hr_count}");
            println!("HTML file '{}' generated successfully.", out.display());
            Ok(())
        }
    }
}
