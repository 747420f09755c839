//! `ls` — display entries grouped by category.

use crate::cli::output;
use crate::errors::Result;

use super::Context;

/// Execute the `ls` command.
pub fn execute(ctx: &mut Context<'_>, filter: Option<&str>) -> Result<()> {
    if ctx.session.is_empty()? {
        output::info("Vault is empty.");
        output::tip("Run `add` to create your first entry.");
        return Ok(());
    }

    let groups = ctx.session.categories(filter)?;
    if groups.is_empty() {
        output::info(&format!(
            "No entries in category '{}'.",
            filter.unwrap_or_default()
        ));
        return Ok(());
    }

    output::print_category_groups(&groups);
    Ok(())
}
