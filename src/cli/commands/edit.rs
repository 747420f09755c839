//! `edit` — change the fields of an entry.
//!
//! Each field is prompted with its current value; an empty answer keeps it.
//! Nothing is changed until every prompt has been answered, and the edit is
//! rejected as a whole if any new value fails validation.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::errors::Result;
use crate::vault::Field;

use super::{parse_entry_number, Context};

/// Execute the `edit` command.
pub fn execute(ctx: &mut Context<'_>, arg: Option<&str>) -> Result<()> {
    let index = parse_entry_number(arg, "edit <n>", ctx.session.len()?)?;
    let current = ctx.session.get(index)?.fields().clone();

    output::info(&format!(
        "Editing: {} (press Enter to keep the current value)",
        current.name
    ));

    let mut answers: Vec<(Field, Zeroizing<String>)> = Vec::new();
    for field in Field::ALL {
        let answer = if field == Field::Secret {
            ctx.ask_password("Password (Enter = keep, g = generate): ")?
        } else {
            let line = ctx.ask(&format!("{} [{}]: ", field.label(), current.get(field)))?;
            let trimmed = line.trim();
            (!trimmed.is_empty()).then(|| Zeroizing::new(trimmed.to_string()))
        };
        if let Some(value) = answer {
            answers.push((field, value));
        }
    }

    let changed = ctx.session.update(index, |fields| {
        for (field, value) in &answers {
            let slot = fields.get_mut(*field);
            slot.clear();
            slot.push_str(value);
        }
    })?;

    if changed {
        output::success("Entry updated.");
    } else {
        output::info("No changes.");
    }
    Ok(())
}
