//! List command - show what a bank contains

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use medusa_core::BankService;

use crate::{output, Context};

/// Arguments for the list command
#[derive(Args)]
pub struct ListArgs {
    /// Bank file (.polyend)
    pub bank: PathBuf,
}

/// Execute the list command
pub fn execute(ctx: &Context, args: ListArgs) -> Result<()> {
    let outcome = ctx.service.inspect(&args.bank);
    output::report(&outcome, ctx.json)
}
