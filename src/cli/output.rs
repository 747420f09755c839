//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use chrono::{DateTime, Local, Utc};
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{CategoryGroup, Field, Record};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Render a stored timestamp in the local time zone.
fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(TIME_FORMAT).to_string()
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Print records grouped by category, each group under its label.
pub fn print_category_groups(groups: &[CategoryGroup<'_>]) {
    for group in groups {
        println!();
        println!("{}", style(&group.label).bold());

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["#", "Name", "Username"]);
        for (index, record) in &group.entries {
            table.add_row(vec![
                (index + 1).to_string(),
                record.name().to_string(),
                or_dash(record.username()),
            ]);
        }
        println!("{table}");
    }
    println!();
}

/// Print one record. The password is never shown.
pub fn print_record(number: usize, record: &Record) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let secret = if record.get(Field::Secret).is_empty() {
        "-".to_string()
    } else {
        format!("******** [use 'cp {number} pass' to copy]")
    };

    table.add_row(vec!["Name".to_string(), record.name().to_string()]);
    table.add_row(vec!["Category".to_string(), record.category().to_string()]);
    table.add_row(vec!["Username".to_string(), or_dash(record.username())]);
    table.add_row(vec!["Password".to_string(), secret]);
    table.add_row(vec!["URL".to_string(), or_dash(record.get(Field::Url))]);
    table.add_row(vec!["SSH key".to_string(), or_dash(record.get(Field::KeyFile))]);
    table.add_row(vec!["Notes".to_string(), or_dash(record.get(Field::Notes))]);
    table.add_row(vec![
        "Created".to_string(),
        local_time(record.created_at()),
    ]);
    table.add_row(vec![
        "Updated".to_string(),
        local_time(record.updated_at()),
    ]);

    println!("{table}");
}

/// Print search hits with their entry numbers.
pub fn print_search_results(query: &str, hits: &[(usize, &Record)]) {
    if hits.is_empty() {
        info("No matches found.");
        return;
    }

    info(&format!("Search results for '{query}':"));

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Category", "Name", "Username"]);
    for (index, record) in hits {
        table.add_row(vec![
            (index + 1).to_string(),
            record.category().to_string(),
            record.name().to_string(),
            or_dash(record.username()),
        ]);
    }
    println!("{table}");
}

/// Print the command reference.
pub fn print_help() {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Command", "Description"]);
    for (cmd, desc) in [
        ("add", "Add a new account"),
        ("ls [category]", "List accounts, optionally one category"),
        ("show <n>", "Show account details"),
        ("cp <n> <field>", "Copy a field to the clipboard (pass|user|url|ssh)"),
        ("edit <n>", "Edit an account"),
        ("rm <n>", "Delete an account"),
        ("search <query>", "Search accounts"),
        ("gen [length]", "Generate a password"),
        ("save", "Save the vault"),
        ("lock", "Save, lock the vault and exit"),
        ("quit", "Same as lock"),
        ("help", "Show this help"),
    ] {
        table.add_row(vec![cmd, desc]);
    }
    println!("{table}");
}
