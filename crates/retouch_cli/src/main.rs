//! retouch CLI
//!
//! Runs scripted editing sessions through the replay engine: execute,
//! step through history, verify replay determinism and inspect scripts.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod script;
mod session;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use retouch_replay::ReplayConfig;
use script::Script;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "retouch")]
#[command(about = "retouch - keyframed undo/redo for a two-layer raster editor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScriptArgs {
    /// Path to the JSON script
    #[arg(short, long)]
    script: PathBuf,
    /// JSON file with a replay config
    #[arg(long)]
    config: Option<PathBuf>,
    /// Keyframe interval, overriding script and config file
    #[arg(long)]
    interval: Option<usize>,
    /// Keyframe window size, overriding script and config file
    #[arg(long)]
    buffer: Option<usize>,
    /// Stop undo at the images the script opens with
    #[arg(long)]
    protect_setup: bool,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a script, then optionally undo and redo
    Run {
        #[command(flatten)]
        args: ScriptArgs,
        /// Steps to undo after the script
        #[arg(long, default_value_t = 0)]
        undo: usize,
        /// Steps to redo after undoing
        #[arg(long, default_value_t = 0)]
        redo: usize,
        /// Write the final mask as a PNG
        #[arg(long)]
        mask_out: Option<PathBuf>,
    },
    /// Check that every history index replays to its live state
    Verify {
        #[command(flatten)]
        args: ScriptArgs,
    },
    /// List the decoded actions of a script
    Inspect {
        #[command(flatten)]
        args: ScriptArgs,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RETOUCH_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Layer config sources: defaults, script, config file, then flags
fn resolve_config(args: &ScriptArgs, script: &Script) -> Result<ReplayConfig> {
    let mut config = script.config.unwrap_or_default();
    if let Some(path) = &args.config {
        let json = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading config {}", path.display()))?;
        config = ReplayConfig::from_json(&json)?;
    }
    if let Some(interval) = args.interval {
        config = config.with_interval(interval);
    }
    if let Some(buffer) = args.buffer {
        config = config.with_buffer(buffer);
    }
    if args.protect_setup {
        config = config.with_protect_setup(true);
    }
    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_mask(path: &Path, engine: &retouch_replay::ReplayEngine) -> Result<()> {
    let mask = &engine.document().mask;
    if mask.dims().is_empty() {
        bail!("mask is empty, nothing to write");
    }
    mask.image()
        .save(path)
        .wrap_err_with(|| format!("writing mask {}", path.display()))
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            args,
            undo,
            redo,
            mask_out,
        } => {
            let script = Script::load(&args.script)?;
            let config = resolve_config(&args, &script)?;
            let (report, engine) = session::run(&script, config, undo, redo)?;
            if let Some(path) = mask_out {
                write_mask(&path, &engine)?;
            }
            if args.json {
                return print_json(&report);
            }
            println!("Actions:     {} ({} skipped)", report.actions, report.skipped);
            println!("Undo/redo:   -{} +{}", report.undone, report.redone);
            println!("Cursor:      {}", report.cursor);
            println!("Keyframes:   {:?} ({} bytes)", report.keyframes, report.retained_bytes);
            println!("Full dims:   {}", report.full_dims);
            println!("Mask pixels: {}", report.covered_pixels);
            println!("Fingerprint: {}", report.fingerprint);
            Ok(())
        }
        Commands::Verify { args } => {
            let script = Script::load(&args.script)?;
            let config = resolve_config(&args, &script)?;
            let report = session::verify(&script, config)?;
            if args.json {
                print_json(&report)?;
            } else {
                println!(
                    "Checked {} replay targets over {} actions",
                    report.targets_checked, report.actions
                );
                println!("Genesis round-trip: {}", if report.genesis_ok { "ok" } else { "FAILED" });
                println!("Tip round-trip:     {}", if report.tip_ok { "ok" } else { "FAILED" });
                if !report.mismatches.is_empty() {
                    println!("Mismatched indices: {:?}", report.mismatches);
                }
            }
            if !report.passed() {
                bail!("replay verification failed");
            }
            Ok(())
        }
        Commands::Inspect { args } => {
            let script = Script::load(&args.script)?;
            let entries = session::inspect(&script)?;
            if args.json {
                return print_json(&entries);
            }
            println!("{} assets, {} actions", script.assets.len(), entries.len());
            for entry in entries {
                let digest = &entry.digest[..12];
                match entry.asset {
                    Some(asset) => {
                        println!("{:>4}  {}  {:<18} {}", entry.index, digest, entry.kind, asset)
                    }
                    None => println!("{:>4}  {}  {}", entry.index, digest, entry.kind),
                }
            }
            Ok(())
        }
    }
}
