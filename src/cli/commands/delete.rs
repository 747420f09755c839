//! `rm` — remove an entry after confirmation.

use crate::cli::output;
use crate::errors::Result;

use super::{parse_entry_number, Context};

/// Execute the `rm` command.
///
/// Only the exact answer `yes` deletes; anything else cancels.
pub fn execute(ctx: &mut Context<'_>, arg: Option<&str>) -> Result<()> {
    let index = parse_entry_number(arg, "rm <n>", ctx.session.len()?)?;
    let name = ctx.session.get(index)?.name().to_string();

    let answer = ctx.ask(&format!("Delete '{name}'? (yes/no): "))?;
    if answer.trim() != "yes" {
        output::info("Cancelled.");
        return Ok(());
    }

    ctx.session.remove(index)?;
    output::success(&format!("Deleted '{name}'."));
    Ok(())
}
