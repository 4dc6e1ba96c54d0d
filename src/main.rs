//! Sovereign CLI
//!
//! Usage:
//!   sovereign --packet scene.json --prose draft.txt            # Score prose
//!   sovereign --packet scene.json --text "inline prose"        # Score inline prose
//!   sovereign --packet scene.json --prose draft.txt --physics  # Law compliance report
//!   sovereign --packet scene.json --prose draft.txt --loop --revisions revs/
//!   sovereign --serve                                          # HTTP API server
//!   sovereign ... --json                                       # JSON output

use clap::Parser;
use colored::{ColoredString, Colorize};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sovereign_core::core::{
    build_delta_report, run_server, AppState, BeatBudgetPolicy, JudgeProvider, ReplayPatchProvider,
    SovereignLoop,
};
use sovereign_core::types::{
    EmotionPhysicsTable, LawComplianceReport, LoopOutcome, SScoreResult, ScenePacket,
    SovereignConfig, SovereignError, SovereignLoopRun, Verdict,
};
use sovereign_core::{AXIS_FLOOR_EXCLUSIVE, SOVEREIGN_THRESHOLD, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "sovereign",
    version = VERSION,
    about = "Sovereign judge - score prose, check emotion physics, run the correction loop",
    long_about = "Scores prose against a scene packet on nine weighted axes and\n\
                  seals it when the composite reaches 92 with no axis at or below 49.\n\n\
                  Modes:\n  \
                  (default)   Score prose once\n  \
                  --physics   Print the emotion physics compliance report\n  \
                  --loop      Run the correction loop over replayed revisions\n  \
                  --serve     HTTP API server\n\n\
                  Verdicts:\n  \
                  SEAL    - composite >= 92 and every axis above the floor\n  \
                  REJECT  - anything else"
)]
struct Args {
    /// Scene packet (JSON file)
    #[arg(short, long)]
    packet: Option<PathBuf>,

    /// Prose to judge (text file)
    #[arg(long)]
    prose: Option<PathBuf>,

    /// Prose to judge, inline
    #[arg(short, long, conflicts_with = "prose")]
    text: Option<String>,

    /// Print the physics compliance report instead of the score
    #[arg(long)]
    physics: bool,

    /// Run the correction loop
    #[arg(short, long = "loop")]
    run_loop: bool,

    /// Directory of revisions replayed in file-name order (with --loop)
    #[arg(long, requires = "run_loop")]
    revisions: Option<PathBuf>,

    /// Override max loop passes
    #[arg(long)]
    max_passes: Option<u32>,

    /// Configuration (JSON file)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emotion physics table (JSON file, default: canonical table)
    #[arg(long)]
    physics_table: Option<PathBuf>,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show per-axis breakdown
    #[arg(long)]
    verbose: bool,
}

/// Log filter used when RUST_LOG is unset or unparsable
const DEFAULT_LOG_FILTER: &str = "sovereign=info";

/// RUST_LOG wins when it parses; the default only fills in when it does not.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.no_color {
        colored::control::set_override(false);
    }

    let mut config = match &args.config {
        Some(path) => SovereignConfig::from_file(path)?,
        None => SovereignConfig::default(),
    };
    if let Some(max_passes) = args.max_passes {
        config.max_passes = max_passes;
        config.validate()?;
    }
    let physics = match &args.physics_table {
        Some(path) => EmotionPhysicsTable::from_json(&std::fs::read_to_string(path)?)?,
        None => EmotionPhysicsTable::canonical(),
    };

    let config = Arc::new(config);
    let physics = Arc::new(physics);
    let judge = JudgeProvider::calc(
        Arc::clone(&config),
        Arc::clone(&physics),
        Arc::new(BeatBudgetPolicy::default()),
    );

    if args.serve {
        print_header("API Server");
        let state = Arc::new(AppState::new(config, physics, judge));
        return run_server(&args.addr, state).await;
    }

    let packet = load_packet(&args)?;
    let prose = load_prose(&args)?;
    packet.validate(&physics)?;

    if args.run_loop {
        let revisions = match &args.revisions {
            Some(dir) => read_revisions(dir)?,
            None => Vec::new(),
        };
        info!(count = revisions.len(), "replaying revisions");
        let patcher = ReplayPatchProvider::new(revisions);
        let run = SovereignLoop::new(&config, &physics, &judge, &patcher)
            .run(&packet, &prose)
            .await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&run)?);
        } else {
            print_loop_run(&run, args.verbose);
        }
    } else if args.physics {
        let report = judge.calc_judge().physics_report(&packet, &prose);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_physics(&report, args.verbose);
        }
    } else {
        let result = judge.score(&packet, &prose).await.map_err(SovereignError::from)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_sscore(&result, args.verbose);
        }
    }
    Ok(())
}

fn load_packet(args: &Args) -> Result<ScenePacket, SovereignError> {
    let path = args
        .packet
        .as_ref()
        .ok_or_else(|| SovereignError::Validation("--packet is required".to_string()))?;
    Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}

fn load_prose(args: &Args) -> Result<String, SovereignError> {
    match (&args.text, &args.prose) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
        (None, None) => Err(SovereignError::Validation(
            "one of --prose or --text is required".to_string(),
        )),
    }
}

/// Regular files in `dir`, sorted by file name
fn read_revisions(dir: &Path) -> Result<Vec<String>, SovereignError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    paths
        .iter()
        .map(|p| std::fs::read_to_string(p).map_err(SovereignError::from))
        .collect()
}

/// Print header
fn print_header(mode: &str) {
    println!("{}", "========================================".bold());
    println!("{}", format!("  Sovereign v{} - {}", VERSION, mode).bold());
    println!("{}", "========================================".bold());
    println!();
}

fn verdict_label(verdict: Verdict) -> ColoredString {
    match verdict {
        Verdict::Seal => verdict.to_string().green().bold(),
        Verdict::Reject => verdict.to_string().red().bold(),
    }
}

fn axis_score_label(score: f64) -> ColoredString {
    let text = format!("{score:6.2}");
    if score < AXIS_FLOOR_EXCLUSIVE {
        text.red()
    } else if score >= SOVEREIGN_THRESHOLD {
        text.green()
    } else {
        text.yellow()
    }
}

/// Print an S-Score result
fn print_sscore(result: &SScoreResult, verbose: bool) {
    println!(
        "{} composite={:.2} emotion_weight={:.1}%",
        verdict_label(result.verdict),
        result.composite,
        result.emotion_weight_pct
    );
    if verbose {
        println!("┌─────────────────────────────────────────────");
        for axis in result.axes.iter() {
            println!(
                "│ {:<18} {} (w={:.1}, {:?})",
                axis.name.as_str(),
                axis_score_label(axis.score),
                axis.weight,
                axis.method
            );
        }
        println!("├─────────────────────────────────────────────");
        let floors = result.floor_violations();
        if !floors.is_empty() {
            let names: Vec<_> = floors.iter().map(|a| a.as_str()).collect();
            println!("│ Floor violations: {}", names.join(", ").red());
        }
        let delta = build_delta_report(result);
        println!("│ Gap to seal: {:.2}", delta.composite_gap);
        println!("│ Hash: {}", result.content_hash.dimmed());
        println!("└─────────────────────────────────────────────");
    }
}

/// Print a physics compliance report
fn print_physics(report: &LawComplianceReport, verbose: bool) {
    let compliance = format!("{:.1}%", report.overall_compliance * 100.0);
    let label = if report.is_fully_compliant() {
        compliance.green().bold()
    } else {
        compliance.yellow().bold()
    };
    println!(
        "physics compliance={} paragraphs={} forced={} infeasible={} decay_violations={} flux={}",
        label,
        report.paragraph_count,
        report.forced_transitions,
        report.feasibility_failures,
        report.law4_violations,
        if report.flux.compliant { "ok".green() } else { "off".red() }
    );
    if verbose {
        for t in &report.transitions {
            let mark = if t.is_compliant() { "✓".green() } else { "✗".red() };
            println!(
                "  {} {} → {} ΔY={:+.1} Δv={:+.2} F={:.2} m={:.2} R={:.2}{}",
                mark,
                t.from.dominant,
                t.to.dominant,
                t.intensity_delta,
                t.valence_delta,
                t.inertia.force,
                t.inertia.mass,
                t.inertia.resistance,
                t.beat_id
                    .as_deref()
                    .map(|b| format!(" beat={b}"))
                    .unwrap_or_default()
            );
            if t.feasibility_fail {
                println!("      {}", t.feasibility.detail.dimmed());
            }
        }
        for seg in &report.decay_segments {
            let mark = if seg.compliant { "✓".green() } else { "✗".red() };
            let deviation = seg
                .deviation
                .map_or_else(|| "n/a".to_string(), |d| format!("{d:.2}"));
            println!(
                "  {} decay {} [{}..{}] deviation={} tolerance={:.2}",
                mark, seg.emotion, seg.start, seg.end, deviation, seg.tolerance
            );
        }
        println!(
            "  flux total={:.3} transferred={:.3} stored={:.3} dissipated={:.3} error={:.3}",
            report.flux.total,
            report.flux.transferred,
            report.flux.stored,
            report.flux.dissipated,
            report.flux.balance_error
        );
    }
}

/// Print a loop run
fn print_loop_run(run: &SovereignLoopRun, verbose: bool) {
    let outcome = match run.outcome {
        LoopOutcome::Sealed => run.outcome.to_string().green().bold(),
        LoopOutcome::Exhausted => run.outcome.to_string().yellow().bold(),
        LoopOutcome::ExecutionFailed => run.outcome.to_string().red().bold(),
    };
    println!(
        "{} {} passes={} accepted={} rolled_back={} composite {:.2} → {:.2} ({:+.2})",
        outcome,
        run.reason.code(),
        run.iterations,
        run.accepted_count,
        run.rollback_count,
        run.s_score_initial.composite,
        run.s_score_final.composite,
        run.loop_delta_composite
    );
    if let Some(failure) = &run.failure {
        println!("  {} {}", failure.reason.to_string().red(), failure.error.dimmed());
    }
    if verbose {
        for pass in &run.trace {
            println!(
                "  #{} {:<26} {:?} {:.2} ({:+.2}) {}",
                pass.pass_index,
                pass.strategy,
                pass.decision,
                pass.candidate_composite,
                pass.delta_composite,
                pass.reason.code()
            );
        }
        for entry in &run.rollback_log {
            let axes: Vec<_> = entry
                .trigger_axes
                .iter()
                .map(|d| format!("{}({:+.1})", d.axis, d.delta))
                .collect();
            println!("  rollback #{}: {}", entry.pass_index, axes.join(" "));
        }
        println!("  trace {}", run.trace_hash.dimmed());
    }
    if run.outcome == LoopOutcome::Sealed {
        println!();
        println!("{}", run.final_prose);
    }
}
