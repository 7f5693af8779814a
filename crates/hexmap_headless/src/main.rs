//! Headless hex map editor.
//!
//! This binary runs the editor without a window, controlled via JSON on
//! stdin/stdout. Designed for scripted sessions, CI checks and map tooling.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p hexmap_headless
//!
//! # Replay a command script with fixed dice, twice, and compare hashes
//! cargo run -p hexmap_headless -- --seed 7 replay --script skirmish.jsonl --verify
//!
//! # Summarise a saved map document
//! cargo run -p hexmap_headless -- validate --map maps/skirmish.json
//!
//! # List token packs
//! cargo run -p hexmap_headless -- assets --dir tokens/
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Diagnostics
//!
//! See the protocol module for command/response format.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hexmap_core::config::EditorConfig;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hexmap_headless::{
    error::Result,
    runner::{HeadlessConfig, HeadlessRunner},
    scan_asset_packs,
    script::{verify_script, Script},
    validate_map, Response,
};

#[derive(Parser)]
#[command(name = "hexmap_headless")]
#[command(about = "Headless hex map editor for scripted sessions and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Editor config file (RON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dice seed for reproducible rolls
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Directory for saved and loaded maps
    #[arg(long, global = true, default_value = "maps")]
    map_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive session on stdin/stdout
    Run {
        /// Output a frame after every command that changed something
        #[arg(long)]
        auto_frame: bool,
    },

    /// Replay a command script
    Replay {
        /// JSON-lines command file
        #[arg(short, long)]
        script: PathBuf,

        /// Replay twice and require identical state hashes
        #[arg(long)]
        verify: bool,
    },

    /// Load a map document and report what it contains
    Validate {
        /// Map document (JSON)
        #[arg(short, long)]
        map: PathBuf,
    },

    /// Scan a tokens directory and list its packs
    Assets {
        /// Tokens directory
        #[arg(short, long)]
        dir: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is for the protocol.
    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    if let Err(e) = dispatch(cli) {
        tracing::error!(error = %e, "command failed");
        eprintln!("FATAL: {e}");
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let editor = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let config = HeadlessConfig {
        editor,
        seed: cli.seed,
        map_dir: cli.map_dir,
        auto_frame: false,
    };

    match cli.command {
        Some(Commands::Run { auto_frame }) => cmd_run(HeadlessConfig {
            auto_frame,
            ..config
        }),
        Some(Commands::Replay { script, verify }) => cmd_replay(&config, script, verify),
        Some(Commands::Validate { map }) => cmd_validate(map),
        Some(Commands::Assets { dir }) => cmd_assets(dir),
        None => cmd_run(config),
    }
}

/// Run an interactive session
fn cmd_run(config: HeadlessConfig) -> Result<()> {
    tracing::info!(seed = ?config.seed, "Starting interactive session");

    let mut runner = HeadlessRunner::new(config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    runner.run(stdin.lock(), &mut stdout)?;
    Ok(())
}

/// Replay a script, optionally checking determinism
fn cmd_replay(config: &HeadlessConfig, path: PathBuf, verify: bool) -> Result<()> {
    let script = Script::load(&path)?;
    if config.seed.is_none() {
        tracing::warn!("no --seed given, dice rolls will differ between runs");
    }

    if verify {
        let hash = verify_script(&script, config, 2)?;
        println!("Replay verified: {} commands, hash {hash:016x}", script.commands.len());
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    let outcome = script.replay(config);
    for response in &outcome.responses {
        stdout.write_all(response.to_json_line().as_bytes())?;
    }
    let summary = Response::StateHash {
        round: outcome.final_round,
        hash: outcome.final_hash,
    };
    stdout.write_all(summary.to_json_line().as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Summarise a map document
fn cmd_validate(path: PathBuf) -> Result<()> {
    let report = validate_map(&path)?;
    println!("Map: {}", path.display());
    println!("  Items:      {}", report.items);
    println!("  Combatants: {}", report.combatants);
    for (faction, count) in &report.factions {
        println!("    {faction}: {count}");
    }
    println!("  Strokes:    {}", report.strokes);
    if report.missing_assets.is_empty() {
        println!("  All images found");
    } else {
        println!("  Missing images ({}):", report.missing_assets.len());
        for path in &report.missing_assets {
            println!("    {path}");
        }
    }
    Ok(())
}

/// List token packs found under a directory
fn cmd_assets(dir: PathBuf) -> Result<()> {
    let catalog = scan_asset_packs(&dir)?;
    let json = serde_json::to_string_pretty(&catalog).map_err(io::Error::from)?;
    println!("{json}");
    Ok(())
}
