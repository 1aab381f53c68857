//! Medusa CLI - Wavetable bank tool for the Polyend Medusa
//!
//! # Commands
//!
//! - `medusa list` - Show slots, identifiers and header diagnostics of a bank
//! - `medusa decompile` - Split a bank into 64 WAVs plus identifier/footer sidecars
//! - `medusa recompile` - Rebuild a bank from a decompiled directory
//! - `medusa create` - Build a bank from a directory of arbitrary audio files
//! - `medusa process` - Condition audio files into a directory `recompile` accepts
//! - `medusa verify` - Byte-compare two banks
//! - `medusa extract` - Write a single slot as WAV or raw payload
//!
//! # Usage
//!
//! ```bash
//! # Edit a bank's wavetables and put it back together
//! medusa decompile factory.polyend -o waves/
//! medusa recompile waves/ edited.polyend --verify-with factory.polyend
//!
//! # Make a new bank from a sample folder
//! medusa create samples/ pads.polyend --random --seed 7 --normalize
//!
//! # Or condition the samples first, tweak them, then pack
//! medusa process samples/ waves/ --single-cycle
//! medusa recompile waves/ pads.polyend
//! ```
//!
//! # Configuration (medusa.toml)
//!
//! Read from `--config` or `./medusa.toml`; command-line flags win.
//!
//! ```toml
//! [build]
//! policy = "random"
//! workers = 4
//!
//! [transcoder]
//! ffmpeg = "/usr/local/bin/ffmpeg"
//! ```

mod create;
mod decompile;
mod extract;
mod list;
mod output;
mod process;
mod recompile;
mod verify;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use medusa_core::{LocalService, MedusaConfig};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Medusa CLI - Wavetable bank tool for the Polyend Medusa
#[derive(Parser)]
#[command(name = "medusa")]
#[command(about = "Decompile, recompile and create Polyend Medusa wavetable banks")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./medusa.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the result as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show slots, identifiers and header diagnostics
    List(list::ListArgs),

    /// Split a bank into per-slot WAV files
    Decompile(decompile::DecompileArgs),

    /// Rebuild a bank from a decompiled directory
    Recompile(recompile::RecompileArgs),

    /// Build a bank from a directory of audio files
    Create(create::CreateArgs),

    /// Condition audio files into a decompiled-style directory
    Process(process::ProcessArgs),

    /// Byte-compare two banks
    Verify(verify::VerifyArgs),

    /// Write one slot as WAV or raw payload
    Extract(extract::ExtractArgs),
}

/// Shared state handed to every command
pub struct Context {
    pub service: LocalService,
    pub json: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    // stderr keeps --json output on stdout clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = MedusaConfig::discover(cli.config.as_deref())?;
    let ctx = Context {
        service: LocalService::new(config),
        json: cli.json,
    };

    match cli.command {
        Commands::List(args) => list::execute(&ctx, args),
        Commands::Decompile(args) => decompile::execute(&ctx, args),
        Commands::Recompile(args) => recompile::execute(&ctx, args),
        Commands::Create(args) => create::execute(&ctx, args),
        Commands::Process(args) => process::execute(&ctx, args),
        Commands::Verify(args) => verify::execute(&ctx, args),
        Commands::Extract(args) => extract::execute(&ctx, args),
    }
}
