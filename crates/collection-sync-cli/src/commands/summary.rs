use crate::output::Output;
use collection_sync_core::{CollectionOutcome, CollectionReport};
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::json;

fn details(outcome: &CollectionOutcome) -> String {
    match outcome {
        CollectionOutcome::Created { items, errors } => with_errors(format!("{} items", items), *errors),
        CollectionOutcome::Updated { added, removed, errors } => {
            with_errors(format!("+{} / -{}", added, removed), *errors)
        }
        CollectionOutcome::Deleted => "no items configured".to_string(),
        CollectionOutcome::SkippedSmart => String::new(),
        CollectionOutcome::Abandoned { reason } => reason.clone(),
        CollectionOutcome::Failed { error } => error.clone(),
    }
}

fn with_errors(text: String, errors: usize) -> String {
    if errors == 0 {
        text
    } else {
        format!("{} ({} failed calls)", text, errors)
    }
}

fn outcome_cell(outcome: &CollectionOutcome) -> Cell {
    let color = match outcome {
        CollectionOutcome::Failed { .. } | CollectionOutcome::Abandoned { .. } => Color::Red,
        _ if outcome.is_problem() => Color::Yellow,
        CollectionOutcome::Deleted | CollectionOutcome::SkippedSmart => Color::Yellow,
        _ => Color::Green,
    };
    Cell::new(outcome.label()).fg(color)
}

pub fn summary_table(reports: &[CollectionReport]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(
        ["Library", "Collection", "Outcome", "Details"]
            .into_iter()
            .map(|h| Cell::new(h).fg(Color::Cyan).add_attribute(Attribute::Bold)),
    );

    for report in reports {
        table.add_row(vec![
            Cell::new(&report.library),
            Cell::new(&report.title),
            outcome_cell(&report.outcome),
            Cell::new(details(&report.outcome)),
        ]);
    }
    table
}

pub fn print_summary(reports: &[CollectionReport], output: &Output) {
    let problems = reports.iter().filter(|r| r.outcome.is_problem()).count();

    if !output.is_human() {
        output.json(&json!({
            "type": "summary",
            "collections": reports,
            "problems": problems,
        }));
        return;
    }

    if output.is_quiet() {
        return;
    }
    if reports.is_empty() {
        output.info("No collections were reconciled.");
        return;
    }

    println!();
    println!("{}", summary_table(reports));

    if problems > 0 {
        output.warn(format!(
            "{} of {} collections had problems, see the log for details",
            problems,
            reports.len()
        ));
    } else {
        output.success(format!("{} collections reconciled", reports.len().bold()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(title: &str, outcome: CollectionOutcome) -> CollectionReport {
        CollectionReport {
            library: "Movies".to_string(),
            title: title.to_string(),
            outcome,
        }
    }

    #[test]
    fn test_details() {
        assert_eq!(details(&CollectionOutcome::Created { items: 3, errors: 0 }), "3 items");
        assert_eq!(
            details(&CollectionOutcome::Updated {
                added: 1,
                removed: 2,
                errors: 1
            }),
            "+1 / -2 (1 failed calls)"
        );
    }

    #[test]
    fn test_summary_table_rows() {
        let reports = vec![
            report("Alien Saga", CollectionOutcome::Created { items: 2, errors: 0 }),
            report(
                "Empty",
                CollectionOutcome::Abandoned {
                    reason: "no items configured".to_string(),
                },
            ),
        ];
        let rendered = summary_table(&reports).to_string();
        assert!(rendered.contains("Alien Saga"));
        assert!(rendered.contains("abandoned"));
        assert!(rendered.contains("no items configured"));
    }

    #[test]
    fn test_report_json_shape() {
        let value = serde_json::to_value(report("Heat", CollectionOutcome::Deleted)).unwrap();
        assert_eq!(value["status"], "deleted");
        assert_eq!(value["library"], "Movies");
        assert_eq!(value["title"], "Heat");
    }
}
