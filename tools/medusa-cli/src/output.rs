//! Rendering of operation outcomes

use anyhow::{Context as _, Result};
use medusa_core::ops::Inspection;
use medusa_core::{Outcome, Verification};

/// Print an outcome and turn a failed one into an error exit
pub fn report(outcome: &Outcome, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(outcome).context("Failed to encode outcome")?;
        println!("{text}");
    } else {
        print_human(outcome);
    }

    if !outcome.success {
        anyhow::bail!(
            "{}",
            outcome.error.as_deref().unwrap_or("operation failed")
        );
    }
    Ok(())
}

/// Print several outcomes; the first failure decides the exit status
pub fn report_all(outcomes: &[Outcome], json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(outcomes).context("Failed to encode outcome")?;
        println!("{text}");
    } else {
        outcomes.iter().for_each(print_human);
    }

    if let Some(failed) = outcomes.iter().find(|o| !o.success) {
        anyhow::bail!(
            "{}",
            failed.error.as_deref().unwrap_or("operation failed")
        );
    }
    Ok(())
}

fn print_human(outcome: &Outcome) {
    if let Some(listing) = &outcome.listing {
        print_listing(listing);
    }
    if let Some(verification) = &outcome.verification {
        print_verification(verification);
    }

    if outcome.success {
        match &outcome.output {
            Some(output) => println!(
                "{:?}: {} slot(s) -> {}",
                outcome.operation,
                outcome.slots,
                output.display()
            ),
            None => println!("{:?}: {} slot(s)", outcome.operation, outcome.slots),
        }
    }

    if outcome.listing.is_none() && !outcome.diagnostics.is_empty() {
        println!("  {} header diagnostic(s):", outcome.diagnostics.len());
        for diagnostic in &outcome.diagnostics {
            println!("    {diagnostic}");
        }
    }

    if !outcome.failures.is_empty() {
        println!("  Skipped {} source(s):", outcome.failures.len());
        for failure in &outcome.failures {
            println!("    {}: {}", failure.path.display(), failure.reason);
        }
    }
}

fn print_listing(listing: &Inspection) {
    println!("Slot  Offset    Identifier  Peak");
    for slot in &listing.slots {
        println!(
            "  {:02}  0x{:06x}  {}{}  {:>5}",
            slot.index,
            slot.offset,
            slot.identifier,
            if slot.canonical { " " } else { "*" },
            slot.peak
        );
    }
    println!("Footer: {} bytes", listing.footer_len);

    if listing.diagnostics.is_empty() {
        println!("Headers: OK");
    } else {
        println!("Headers: {} diagnostic(s)", listing.diagnostics.len());
        for diagnostic in &listing.diagnostics {
            println!("  {diagnostic}");
        }
    }
}

fn print_verification(verification: &Verification) {
    match verification {
        Verification::Identical { len } => println!("Identical ({len} bytes)"),
        Verification::SizeMismatch { expected, actual } => {
            println!("Size mismatch: expected {expected} bytes, got {actual}")
        }
        Verification::Differs {
            offset,
            expected,
            actual,
        } => {
            println!("First difference at 0x{offset:06x}");
            println!("  expected: {expected}");
            println!("  actual:   {actual}");
        }
    }
}
