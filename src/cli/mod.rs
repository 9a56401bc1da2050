//! ASCII table rendering for the REPL binary.

use crate::api::Suggestion;
use crate::identity::{permissions_for, Identity};

// Cap to keep output readable on ordinary terminals
const MAX_COL_WIDTH: usize = 60;

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn build_separator(widths: &[usize]) -> String {
    let mut sep = String::from("+");
    for w in widths {
        sep.push_str(&"-".repeat(w + 2));
        sep.push('+');
    }
    sep
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut row = String::from("|");
    for (cell, w) in cells.iter().zip(widths) {
        row.push(' ');
        row.push_str(cell);
        row.push_str(&" ".repeat(w.saturating_sub(cell.chars().count())));
        row.push_str(" |");
    }
    row
}

/// Render the pending queue as a table. In-flight entries are flagged in the
/// first column so a slow server response is visible while it is awaited.
pub fn print_suggestions(items: &[Suggestion], in_flight: &[String]) {
    if items.is_empty() {
        println!("no pending suggestions");
        return;
    }
    let header: Vec<String> =
        ["", "id", "title", "summary", "status"].iter().map(|s| s.to_string()).collect();
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(items.len());
    for item in items {
        let flag = if in_flight.contains(&item.id) { "*" } else { "" };
        rows.push(vec![
            flag.to_string(),
            clip(&item.id, MAX_COL_WIDTH),
            clip(&item.title, MAX_COL_WIDTH),
            clip(item.change_summary.as_deref().unwrap_or(""), MAX_COL_WIDTH),
            item.status.as_str().to_string(),
        ]);
    }

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            let w = cell.chars().count();
            if w > widths[i] {
                widths[i] = w;
            }
        }
    }

    let sep = build_separator(&widths);
    println!("{}", sep);
    println!("{}", build_row(&header, &widths));
    println!("{}", sep);
    for row in &rows {
        println!("{}", build_row(row, &widths));
    }
    println!("{}", sep);
    if !in_flight.is_empty() {
        println!("* action in flight");
    }
}

/// One-line-per-field profile dump for `whoami`.
pub fn print_identity(identity: &Identity) {
    println!("user:    {} ({})", identity.display_name(), identity.username);
    println!("email:   {}", identity.email);
    println!("role:    {}", identity.role);
    println!("level:   {} ({} xp)", identity.level, identity.xp);
    println!(
        "flags:   {}{}",
        if identity.is_active { "active" } else { "inactive" },
        if identity.is_verified { ", verified" } else { "" }
    );
    let mut perms: Vec<&str> = permissions_for(identity.role).iter().copied().collect();
    perms.sort();
    println!("grants:  {}", if perms.is_empty() { "(none)".to_string() } else { perms.join(", ") });
}
