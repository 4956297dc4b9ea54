//! Table output formatting for CLI commands
//!
//! Formats bucket history and distribution views using comfy-table, with
//! color-coded cells and automatic column sizing.

use std::collections::HashMap;
use std::env;

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};

use crate::domain::models::{Bucket, BucketChangeRecord, TransitionDirection};

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self { use_colors: supports_color() }
    }

    pub fn with_config(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Format bucket change records as a table, in the order given.
    pub fn format_history(&self, records: &[BucketChangeRecord]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("When").add_attribute(Attribute::Bold),
            Cell::new("Direction").add_attribute(Attribute::Bold),
            Cell::new("From").add_attribute(Attribute::Bold),
            Cell::new("To").add_attribute(Attribute::Bold),
            Cell::new("Confidence").add_attribute(Attribute::Bold),
            Cell::new("Reason").add_attribute(Attribute::Bold),
        ]);

        for record in records {
            let direction_cell = if self.use_colors {
                Cell::new(record.direction.as_str()).fg(direction_color(record.direction))
            } else {
                Cell::new(format!(
                    "{} {}",
                    direction_icon(record.direction),
                    record.direction.as_str()
                ))
            };

            table.add_row(vec![
                Cell::new(record.occurred_at.format("%Y-%m-%d %H:%M UTC").to_string()),
                direction_cell,
                Cell::new(record.from_bucket.as_str()),
                Cell::new(record.to_bucket.as_str()),
                Cell::new(format!("{:.2}", record.confidence)),
                Cell::new(truncate_text(&record.reason, 50)),
            ]);
        }

        table.to_string()
    }

    /// Format the per-bucket speaker counts, worst-to-best.
    pub fn format_distribution(&self, distribution: &HashMap<Bucket, i64>) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Bucket").add_attribute(Attribute::Bold),
            Cell::new("Speakers").add_attribute(Attribute::Bold),
        ]);

        for bucket in Bucket::all() {
            let count = distribution.get(&bucket).copied().unwrap_or(0);
            let bucket_cell = if self.use_colors {
                Cell::new(bucket.as_str()).fg(bucket_color(bucket))
            } else {
                Cell::new(bucket.as_str())
            };
            table.add_row(vec![bucket_cell, Cell::new(count.to_string())]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_BORDERS_ONLY)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn direction_color(direction: TransitionDirection) -> Color {
    match direction {
        TransitionDirection::Promotion => Color::Green,
        TransitionDirection::Demotion => Color::Red,
    }
}

fn direction_icon(direction: TransitionDirection) -> &'static str {
    match direction {
        TransitionDirection::Promotion => "↑",
        TransitionDirection::Demotion => "↓",
    }
}

fn bucket_color(bucket: Bucket) -> Color {
    match bucket {
        Bucket::HighTouch => Color::Red,
        Bucket::MediumTouch => Color::Yellow,
        Bucket::LowTouch => Color::Cyan,
        Bucket::NoTouch => Color::Green,
    }
}

/// Check whether the terminal supports color output
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }
    true
}

/// Truncate text to a maximum length, adding an ellipsis
fn truncate_text(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        text.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        format!("{}...", &text[..max_len - 3])
    }
}
