//! `cp` — copy one field of an entry to the clipboard.

use crate::cli::output;
use crate::errors::{AcctMgrError, Result};
use crate::vault::Field;

use super::{parse_entry_number, Context};

const USAGE: &str = "cp <n> <pass|user|url|ssh>";

/// Execute the `cp` command.
pub fn execute(ctx: &mut Context<'_>, number: Option<&str>, field: Option<&str>) -> Result<()> {
    let index = parse_entry_number(number, USAGE, ctx.session.len()?)?;

    let name = field.ok_or_else(|| AcctMgrError::CommandFailed(format!("Usage: {USAGE}")))?;
    let field = Field::parse(name).ok_or_else(|| {
        AcctMgrError::CommandFailed(format!("Unknown field: {name} (use: pass, user, url, ssh)"))
    })?;

    let note = ctx.clipboard_note();
    if ctx.session.copy_field(index, field, &mut *ctx.clipboard)? {
        output::success(&format!("{} copied to clipboard{note}", field.label()));
    } else {
        output::warning(&format!("{} is empty.", field.label()));
    }
    Ok(())
}
