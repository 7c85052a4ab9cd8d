use crate::metrics::{MetricRow, MetricTable, Report, SkipReason};

/// Render a deterministic markdown report of every metric table.
pub fn render_report(report: &Report) -> String {
    let mut lines = Vec::new();

    lines.push("# Phishing Dataset Benchmark".to_string());
    lines.push(String::new());
    lines.push("## Run summary".to_string());
    lines.push(format!(
        "- datasets configured: {}",
        report.summary.datasets_configured
    ));
    lines.push(format!(
        "- datasets evaluated: {}",
        report.summary.datasets_evaluated
    ));
    lines.push(format!("- column loads: {}", report.summary.loads.loads));
    lines.push(format!(
        "- peak table bytes: {}",
        report.summary.loads.peak_table_bytes
    ));
    lines.push(String::new());

    push_table(&mut lines, &report.uniqueness, None);
    push_table(&mut lines, &report.brands, Some("Top brands"));
    push_table(&mut lines, &report.languages, Some("Top languages"));
    push_table(&mut lines, &report.completeness, None);
    push_table(&mut lines, &report.url, Some("Top TLDs"));
    push_table(&mut lines, &report.extraction, None);

    let skipped = report.skipped_datasets();
    if !skipped.is_empty() {
        lines.push("## Skipped datasets".to_string());
        for name in skipped {
            let location = report
                .skipped
                .iter()
                .find(|record| record.dataset == name)
                .map(|record| match &record.reason {
                    SkipReason::NotFound { location } => location.display().to_string(),
                })
                .unwrap_or_default();
            lines.push(format!("- {name}: file not found ({location})"));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Render one table as a markdown pipe table.
pub fn render_table<R: MetricRow>(table: &MetricTable<R>) -> String {
    let mut lines = Vec::new();
    push_rows(&mut lines, table);
    lines.join("\n")
}

fn push_table<R: MetricRow>(
    lines: &mut Vec<String>,
    table: &MetricTable<R>,
    ranking: Option<&str>,
) {
    let kind = table.metric();
    lines.push(format!("## [{}/6] {}", kind.step(), kind.title()));
    if table.is_empty() {
        lines.push("_no datasets evaluated_".to_string());
        lines.push(String::new());
        return;
    }

    push_rows(lines, table);
    lines.push(String::new());

    if let Some(label) = ranking {
        lines.push(format!("{label}:"));
        for row in table.rows() {
            let values = row
                .top_values()
                .iter()
                .map(|entry| format!("{} ({})", entry.value, entry.count))
                .collect::<Vec<_>>();
            let values = if values.is_empty() {
                "-".to_string()
            } else {
                values.join(", ")
            };
            lines.push(format!("- {}: {}", row.dataset(), values));
        }
        lines.push(String::new());
    }

    let defaulted = table
        .rows()
        .iter()
        .filter(|row| !row.missing_columns().is_empty())
        .map(|row| format!("- {}: {}", row.dataset(), row.missing_columns().join(", ")))
        .collect::<Vec<_>>();
    if !defaulted.is_empty() {
        lines.push("Missing columns (reported as 0):".to_string());
        lines.extend(defaulted);
        lines.push(String::new());
    }
}

fn push_rows<R: MetricRow>(lines: &mut Vec<String>, table: &MetricTable<R>) {
    lines.push(format!("| {} |", R::HEADER.join(" | ")));
    let separator = R::HEADER.iter().map(|_| "---").collect::<Vec<_>>();
    lines.push(format!("| {} |", separator.join(" | ")));
    for row in table.rows() {
        let cells = row
            .record()
            .iter()
            .map(|cell| escape_cell(cell))
            .collect::<Vec<_>>();
        lines.push(format!("| {} |", cells.join(" | ")));
    }
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
}
