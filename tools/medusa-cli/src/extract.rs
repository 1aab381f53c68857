//! Extract command - pull a single slot out of a bank

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use medusa_core::BankService;

use crate::{output, Context};

/// Arguments for the extract command
#[derive(Args)]
pub struct ExtractArgs {
    /// Bank file (.polyend)
    pub bank: PathBuf,

    /// Slot index (0-63)
    pub index: usize,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Write the whole 16000-byte slot record (header and payload) instead of a WAV
    #[arg(long)]
    pub raw: bool,
}

/// Execute the extract command
pub fn execute(ctx: &Context, args: ExtractArgs) -> Result<()> {
    let outcome = ctx
        .service
        .extract(&args.bank, args.index, &args.output, args.raw);
    output::report(&outcome, ctx.json)
}
