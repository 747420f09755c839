//! `show` — display one entry. The password stays hidden.

use crate::cli::output;
use crate::errors::Result;

use super::{parse_entry_number, Context};

/// Execute the `show` command.
pub fn execute(ctx: &mut Context<'_>, arg: Option<&str>) -> Result<()> {
    let index = parse_entry_number(arg, "show <n>", ctx.session.len()?)?;
    output::print_record(index + 1, ctx.session.get(index)?);
    Ok(())
}
