//! textcad - CLI tool to turn a manufacturing prompt into a part, quote and CAD export.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use textcad::{
    compile_freecad_script, export_part, process_prompt, EngineConfig, FormatKind, FreeCadKernel,
};

/// Turn a short manufacturing prompt into a parametric part, DFM score and cost estimate.
#[derive(Parser, Debug)]
#[command(name = "textcad")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Part description, e.g. "50x50x10 plate with 5mm center hole"
    prompt: String,

    /// Material name or alias (defaults to the configured material)
    #[arg(short, long)]
    material: Option<String>,

    /// Export format (stl, step, stp, iges, igs); repeatable
    #[arg(short, long = "format", default_value = "stl")]
    formats: Vec<FormatKind>,

    /// Directory for kernel scripts and exported files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Path to FreeCADCmd (searched for when omitted)
    #[arg(long)]
    kernel: Option<PathBuf>,

    /// Kernel timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Run the geometry kernel and export the part
    #[arg(short, long)]
    export: bool,

    /// Print the FreeCAD script instead of running it
    #[arg(long, conflicts_with = "export")]
    script_only: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = args.output_dir {
        config.kernel.output_dir = dir;
    }
    if args.kernel.is_some() {
        config.kernel.command = args.kernel;
    }
    if let Some(timeout) = args.timeout {
        config.kernel.timeout_secs = timeout;
    }

    let report = process_prompt(&args.prompt, args.material.as_deref(), &config, None)
        .with_context(|| format!("Failed to process \"{}\"", args.prompt))?;

    for warning in &report.plan.warnings {
        warn!("{}", warning);
    }
    for question in &report.ambiguities {
        warn!("Clarify: {} ({})", question.question, question.options.join(" / "));
    }

    if args.script_only {
        print!("{}", compile_freecad_script(&report.plan, &[]));
        return Ok(());
    }

    if !args.json {
        info!(
            "{} in {}: {} primitive(s), {} operation(s)",
            report.shape,
            report.material,
            report.plan.primitives.len(),
            report.plan.operations.len()
        );
        for note in &report.plan.notes {
            info!("Note: {}", note);
        }
        info!(
            "DFM score {}/100, recommended process: {}",
            report.dfm.score, report.dfm.recommended_process
        );
        for finding in &report.dfm.warnings {
            warn!("DFM: {} Suggestion: {}", finding.message, finding.suggestion);
        }
        info!(
            "Cost: {:.2} total ({:.2} material, {:.2} machining, {:.2} setup), {:.1} min, {:.1} g",
            report.cost.total_cost,
            report.cost.material_cost,
            report.cost.machining_cost,
            report.cost.setup_cost,
            report.cost.machining_time_minutes,
            report.cost.weight_grams
        );
    }

    let exported = if args.export {
        let kernel = FreeCadKernel::discover(config.kernel.clone())
            .context("Geometry kernel unavailable")?;
        let exported = export_part(&report, &kernel, &args.formats)
            .with_context(|| format!("Failed to export {}", report.shape))?;

        for (format, path) in &exported.artifacts.files {
            info!("Generated {}: {}", format, path.display());
        }
        if let Some(accuracy) = &exported.accuracy {
            if accuracy.valid {
                info!("{}", accuracy.message);
            } else {
                error!("{}", accuracy.message);
            }
        }
        Some(exported)
    } else {
        None
    };

    if args.json {
        let json = match &exported {
            Some(exported) => serde_json::to_string_pretty(&serde_json::json!({
                "part": report,
                "export": exported,
            }))?,
            None => serde_json::to_string_pretty(&report)?,
        };
        println!("{}", json);
    }

    if let Some(accuracy) = exported.as_ref().and_then(|e| e.accuracy.as_ref()) {
        if !accuracy.valid {
            anyhow::bail!("Exported part is outside dimensional tolerance");
        }
    }

    Ok(())
}
