//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use chrono::DateTime;
use comfy_table::{ContentArrangement, Table};
use console::style;

/// One row of the `list` table.
pub struct ItemRow {
    pub uuid: String,
    pub category: &'static str,
    pub title: String,
    pub username: String,
    pub updated: i64,
}

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

/// Print a `label: value` line with a bold label.
pub fn field(label: &str, value: &str) {
    println!("{:>10}: {}", style(label).bold(), value);
}

/// Render a Unix timestamp for display.
pub fn timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// Print a table of items (Uuid, Type, Title, Username, Updated).
pub fn print_items_table(items: &[ItemRow]) {
    if items.is_empty() {
        info("No items in this vault yet.");
        tip("Run `opvault add <TITLE>` to add your first login.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Uuid", "Type", "Title", "Username", "Updated"]);

    for row in items {
        table.add_row(vec![
            row.uuid.chars().take(8).collect::<String>(),
            row.category.to_string(),
            row.title.clone(),
            row.username.clone(),
            timestamp(row.updated),
        ]);
    }

    println!("{table}");
}
