//! `search` — case-insensitive search across entries.

use crate::cli::output;
use crate::errors::{AcctMgrError, Result};

use super::Context;

/// Execute the `search` command.
pub fn execute(ctx: &mut Context<'_>, query: &str) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AcctMgrError::CommandFailed("Usage: search <query>".into()));
    }

    let hits = ctx.session.search(query)?;
    output::print_search_results(query, &hits);
    Ok(())
}
