//! Verify command - byte comparison of two banks

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use medusa_core::BankService;

use crate::{output, Context};

/// Arguments for the verify command
#[derive(Args)]
pub struct VerifyArgs {
    /// Reference bank
    pub expected: PathBuf,

    /// Bank to check
    pub actual: PathBuf,
}

/// Execute the verify command
pub fn execute(ctx: &Context, args: VerifyArgs) -> Result<()> {
    let outcome = ctx.service.verify(&args.expected, &args.actual);
    output::report(&outcome, ctx.json)
}
