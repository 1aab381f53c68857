//! Decompile command - split a bank into editable WAV files

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use medusa_core::files::default_output_dir;
use medusa_core::BankService;

use crate::{output, Context};

/// Arguments for the decompile command
#[derive(Args)]
pub struct DecompileArgs {
    /// Bank file (.polyend)
    pub bank: PathBuf,

    /// Output directory (default: `waves/` next to the bank)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the decompile command
pub fn execute(ctx: &Context, args: DecompileArgs) -> Result<()> {
    let output_dir = args
        .output
        .unwrap_or_else(|| default_output_dir(&args.bank));
    let outcome = ctx.service.decompile(&args.bank, &output_dir);
    output::report(&outcome, ctx.json)
}
