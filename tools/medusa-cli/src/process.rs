//! Process command - condition audio files into an editable directory
//!
//! Runs the same pipeline as `create` but stops short of packing: each
//! source lands as `wavetable_NN.wav` plus its `.id` sidecar, ready for
//! hand edits and a later `medusa recompile`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use medusa_core::BankService;

use crate::create::SourceOptions;
use crate::{output, Context};

/// Arguments for the process command
#[derive(Args)]
pub struct ProcessArgs {
    /// Directory of source audio files
    pub input_dir: PathBuf,

    /// Directory to write slot WAVs into
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub sources: SourceOptions,
}

/// Execute the process command
pub fn execute(ctx: &Context, args: ProcessArgs) -> Result<()> {
    let options = args.sources.build_options(ctx)?;
    let outcome = ctx
        .service
        .process(&args.input_dir, &args.output_dir, &options);
    output::report(&outcome, ctx.json)
}
