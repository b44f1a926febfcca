use chrono::Local;
use colored::Colorize;
use pagemark::model::{PositionStore, Setting, SettingValue};
use pagemark::repository::{LoadIssue, SaveOutcome};
use std::path::Path;

const KEY_WIDTH: usize = 18;

pub fn print_warnings(outcome: &SaveOutcome) {
    for warning in &outcome.warnings {
        eprintln!("{}", format!("Warning: {}", warning).yellow());
    }
}

pub fn print_load_issues(issues: &[LoadIssue]) {
    for issue in issues {
        eprintln!(
            "{}",
            format!(
                "Warning: {} settings at {} replaced by defaults ({})",
                issue.record, issue.location, issue.reason
            )
            .yellow()
        );
    }
}

pub fn print_setting(setting: Setting, value: &SettingValue) {
    println!("{:<width$} {}", setting.key(), value, width = KEY_WIDTH);
}

pub fn print_folders(folders: &[String]) {
    if folders.is_empty() {
        println!("{}", "No recent folders.".dimmed());
        return;
    }
    for (i, folder) in folders.iter().enumerate() {
        let line = format!("{:>2}. {}", i + 1, folder);
        if Path::new(folder).is_dir() {
            println!("{}", line);
        } else {
            println!("{} {}", line.dimmed(), "(missing)".red());
        }
    }
}

/// Most recently viewed first.
pub fn print_positions(positions: &PositionStore) {
    if positions.is_empty() {
        println!("{}", "No recorded positions.".dimmed());
        return;
    }
    for (document, entry) in positions.entries().rev() {
        let touched = entry
            .touched_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M");
        println!(
            "{}  {}  {}",
            format!("{:>6}", format!("p.{}", entry.page)).yellow(),
            touched.to_string().dimmed(),
            document
        );
    }
}

pub fn print_heading(title: &str) {
    println!("{}", title.bold());
}
