//! Recompile command - rebuild a bank from a decompiled directory

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use medusa_core::BankService;

use crate::{output, Context};

/// Arguments for the recompile command
#[derive(Args)]
pub struct RecompileArgs {
    /// Directory holding wavetable_00.wav .. wavetable_63.wav
    pub input_dir: PathBuf,

    /// Bank file to write (.polyend)
    pub output: PathBuf,

    /// Compare the result byte for byte against this bank
    #[arg(long)]
    pub verify_with: Option<PathBuf>,
}

/// Execute the recompile command
pub fn execute(ctx: &Context, args: RecompileArgs) -> Result<()> {
    let recompiled = ctx.service.recompile(&args.input_dir, &args.output);

    match args.verify_with {
        Some(reference) if recompiled.success => {
            let verified = ctx.service.verify(&reference, &args.output);
            output::report_all(&[recompiled, verified], ctx.json)
        }
        _ => output::report(&recompiled, ctx.json),
    }
}
