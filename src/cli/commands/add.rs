//! `add` — create a new account entry.

use crate::cli::output;
use crate::errors::{AcctMgrError, Result};
use crate::vault::{RecordFields, DEFAULT_CATEGORY, MAX_ENTRIES};

use super::Context;

/// Execute the `add` command.
pub fn execute(ctx: &mut Context<'_>) -> Result<()> {
    if ctx.session.len()? >= MAX_ENTRIES {
        return Err(AcctMgrError::CapacityExceeded {
            requested: MAX_ENTRIES + 1,
            capacity: MAX_ENTRIES,
        });
    }

    let name = ctx.ask("Name: ")?;
    if name.trim().is_empty() {
        output::info("Cancelled.");
        return Ok(());
    }

    let mut fields = RecordFields::named(name.trim());
    fields
        .category
        .push_str(ctx.ask(&format!("Category [{DEFAULT_CATEGORY}]: "))?.trim());
    fields.username.push_str(ctx.ask("Username: ")?.trim());
    if let Some(secret) = ctx.ask_password("Password (g = generate): ")? {
        fields.secret.push_str(&secret);
    }
    fields.url.push_str(ctx.ask("URL: ")?.trim());
    fields.key_file.push_str(ctx.ask("SSH key path: ")?.trim());
    fields.notes.push_str(ctx.ask("Notes: ")?.trim());

    let index = ctx.session.add(fields)?;
    let record = ctx.session.get(index)?;
    output::success(&format!("Added entry #{}: {}", index + 1, record.name()));
    Ok(())
}
