//! `gen` — generate a random password and optionally copy it.

use crate::cli::output;
use crate::crypto::generate::{clamp_length, generate_password};
use crate::errors::Result;

use super::Context;

/// Execute the `gen` command.
///
/// Lengths outside 8..=64 are clamped; an unparsable length falls back to
/// the configured default.
pub fn execute(ctx: &mut Context<'_>, arg: Option<&str>) -> Result<()> {
    let requested = arg
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(ctx.generated_len);
    let len = clamp_length(requested);

    let password = generate_password(len);
    output::info(&format!("Generated ({len} chars): {}", password.as_str()));

    let answer = ctx.ask("Copy to clipboard? (y/n): ")?;
    if answer.trim().starts_with(['y', 'Y']) {
        ctx.clipboard.set(&password)?;
        output::success(&format!("Copied{}", ctx.clipboard_note()));
    }
    Ok(())
}
