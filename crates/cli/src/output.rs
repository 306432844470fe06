//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use logcentral_lib::LogRecord;
use serde::{Deserialize, Serialize};
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a table from a list of items
pub fn print_table<T: Tabled + Serialize>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No items found".yellow());
                return;
            }
            let table = Table::new(items).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(&items) {
                println!("{}", json);
            }
        }
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Color a tag by severity
pub fn color_tag(tag: &str) -> String {
    match tag.to_uppercase().as_str() {
        "ERROR" | "FATAL" | "CRITICAL" => tag.red().bold().to_string(),
        "WARN" | "WARNING" => tag.yellow().to_string(),
        "INFO" => tag.green().to_string(),
        "DEBUG" | "TRACE" => tag.dimmed().to_string(),
        _ => tag.cyan().to_string(),
    }
}

/// One line per record: time, producer, tag, text
pub fn format_record(record: &LogRecord) -> String {
    let text = if record.is_binary {
        format!("<binary, {} bytes>", record.text.len())
    } else {
        record.text.clone()
    };
    format!(
        "{} {} {} {}",
        record.timestamp.to_string().dimmed(),
        record.producer_name.bold(),
        color_tag(&record.tag),
        text
    )
}

/// Print a streamed record; JSON output is one object per line
pub fn print_record(record: &LogRecord, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", format_record(record)),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string(record) {
                println!("{}", json);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logcentral_lib::LogTime;

    fn record(tag: &str, text: &str) -> LogRecord {
        LogRecord {
            producer_name: "app1".to_string(),
            timestamp: LogTime::new(1_700_000_000, 5),
            is_binary: false,
            tag: tag.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_format_record() {
        colored::control::set_override(false);
        assert_eq!(
            format_record(&record("ERROR", "disk full")),
            "2023-11-14T22:13:20.005Z app1 ERROR disk full"
        );
    }

    #[test]
    fn test_format_binary_record() {
        colored::control::set_override(false);
        let line = format_record(&record("DUMP", "abcd").binary(true));
        assert!(line.ends_with("DUMP <binary, 4 bytes>"));
    }

    #[test]
    fn test_color_tag_keeps_text() {
        colored::control::set_override(false);
        assert_eq!(color_tag("WARN"), "WARN");
        assert_eq!(color_tag("custom"), "custom");
    }
}
