//! Create command - build a bank from arbitrary audio files
//!
//! Sources are picked alphabetically (or at random with `--random`), decoded
//! natively for WAV or through ffmpeg for anything else, downmixed,
//! resampled to 44.1 kHz and fitted to a slot.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use medusa_core::{BankService, BuildOptions, SelectionPolicy};

use crate::{output, Context};

/// Source selection and conditioning flags shared by create and process
#[derive(Args, Debug)]
pub struct SourceOptions {
    /// Pick sources at random instead of alphabetically
    #[arg(long)]
    pub random: bool,

    /// Seed for --random, for reproducible banks
    #[arg(long)]
    pub seed: Option<u64>,

    /// Scale each slot to full scale
    #[arg(long)]
    pub normalize: bool,

    /// Keep one 2048-sample cycle per source
    #[arg(long)]
    pub single_cycle: bool,

    /// Parallel workers (default: one per core)
    #[arg(long)]
    pub workers: Option<usize>,
}

impl SourceOptions {
    /// Config values with command-line flags applied on top
    pub fn build_options(&self, ctx: &Context) -> Result<BuildOptions> {
        if self.workers == Some(0) {
            anyhow::bail!("--workers must be at least 1");
        }

        let mut options = BuildOptions::from_config(ctx.service.config());
        if self.random {
            options.policy = SelectionPolicy::Random;
        }
        if self.seed.is_some() {
            options.seed = self.seed;
        }
        if self.workers.is_some() {
            options.workers = self.workers;
        }
        options.normalize |= self.normalize;
        options.single_cycle |= self.single_cycle;
        tracing::debug!("Build options: {:?}", options);
        Ok(options)
    }
}

/// Arguments for the create command
#[derive(Args)]
pub struct CreateArgs {
    /// Directory of source audio files
    pub input_dir: PathBuf,

    /// Bank file to write (.polyend)
    pub output: PathBuf,

    #[command(flatten)]
    pub sources: SourceOptions,
}

/// Execute the create command
pub fn execute(ctx: &Context, args: CreateArgs) -> Result<()> {
    let options = args.sources.build_options(ctx)?;
    let outcome = ctx
        .service
        .create_bank(&args.input_dir, &args.output, &options);
    output::report(&outcome, ctx.json)
}
