//! cli/src/output.rs
//! Output utilities for the CLI
//! description: styles for terminal messages and the per-item summary table.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use console::Style;
use posec_core::{ItemOutcome, PosecErrorExt, SessionReport};

/// Styles for different output elements
pub struct FormatStyle {
    pub title: Style,
    pub info: Style,
    pub warning: Style,
    pub error: Style,
    pub success: Style,
}

impl Default for FormatStyle {
    fn default() -> Self {
        FormatStyle {
            title: Style::new().bold().underlined(),
            info: Style::new().cyan(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            success: Style::new().green().bold(),
        }
    }
}

fn outcome_kind(outcome: &ItemOutcome) -> &'static str {
    match outcome {
        ItemOutcome::Declared { .. } => "declared",
        ItemOutcome::Defined { .. } => "defined",
        ItemOutcome::Evaluated { .. } => "evaluated",
        ItemOutcome::Lowered { .. } => "lowered",
    }
}

/// One row per item: index, item, status, detail.
pub fn summary_table(report: &SessionReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "item", "status", "detail"]);

    for item in report.items.iter() {
        let (status, detail) = match &item.result {
            Ok(outcome) => {
                let detail = match outcome {
                    ItemOutcome::Evaluated { value } => value.to_string(),
                    ItemOutcome::Lowered { function } => format!("{} blocks", function.blocks.len()),
                    ItemOutcome::Declared { name } | ItemOutcome::Defined { name } => name.clone(),
                };
                (Cell::new(outcome_kind(outcome)).fg(Color::Green), detail)
            }
            Err(e) => (Cell::new(e.level().to_string().to_lowercase()).fg(Color::Red), error_line(&**e)),
        };
        table.add_row(vec![Cell::new(item.index), Cell::new(&item.summary), status, Cell::new(detail)]);
    }
    table
}

pub fn error_line(error: &dyn PosecErrorExt) -> String {
    match error.location() {
        Some(loc) => format!("{}: {}", loc, error.message()),
        None => error.message(),
    }
}

/// Print every failure of `report` to stderr.
pub fn print_failures(report: &SessionReport, style: &FormatStyle) {
    for item in report.failures() {
        if let Err(e) = &item.result {
            eprintln!("{} {}", style.error.apply_to("error:"), error_line(&**e));
        }
    }
}
