//! Output formatting: terminal tree, JSON and the HTML report

use crate::config::ExportConfig;
use crate::error::Result;
use crate::report::{ConsolidatedReport, ReportSection, SummaryRow, TableSummary};
use crate::table::{Table, Value};
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Pretty printer for terminal output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print a consolidated report as a tree
    pub fn print_report(
        report: &ConsolidatedReport,
        comparison: Option<&Table>,
        max_detail_values: usize,
    ) {
        print!("{}", Self::render_report(report, comparison, max_detail_values));
    }

    pub fn render_report(
        report: &ConsolidatedReport,
        comparison: Option<&Table>,
        max_detail_values: usize,
    ) -> String {
        let mut lines = vec![
            format!("📊 {}", report.meta.title_text),
            format!("├─ Date: {}", report.meta.report_date),
        ];
        if let Some(subset) = &report.meta.column_subset {
            lines.push(format!("├─ Column subset: {}", subset.join(", ")));
        }
        lines.push(table_summary_line("Old table", &report.old_df_table_summary));
        lines.push(table_summary_line("New table", &report.new_df_table_summary));

        for section in report.sections() {
            if section.is_equal() {
                lines.push(format!("├─ ✅ {}: {}", section.title(), section.equal_message()));
                continue;
            }

            lines.push(format!("├─ ❌ {}", section.title()));
            let mut details: Vec<String> = section.summary().to_vec();
            for (category, values) in section.values() {
                details.push(format!(
                    "{}: {}",
                    category.header(),
                    sample(&values, max_detail_values)
                ));
            }
            for (i, detail) in details.iter().enumerate() {
                let marker = if i == details.len() - 1 { "└─" } else { "├─" };
                lines.push(format!("│  {} {}", marker, detail));
            }
        }

        match comparison {
            Some(table) => lines.push(format!(
                "└─ Comparison table: {} changed record(s), {} column(s)",
                table.row_count(),
                table.column_count()
            )),
            None if report.meta.is_all_equal => {
                lines.push("└─ ✅ The tables are identical".to_string())
            }
            None => lines.push("└─ There are no record changes".to_string()),
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

fn table_summary_line(label: &str, summary: &TableSummary) -> String {
    format!(
        "├─ {}: {} records, {} columns (primary key '{}', unique: {})",
        label,
        summary.number_of_records,
        summary.number_of_columns,
        summary.primary_key,
        summary.is_primary_key_unique
    )
}

/// The first `max` values joined with commas, noting how many were left out
fn sample(values: &[String], max: usize) -> String {
    let shown = values.iter().take(max).cloned().collect::<Vec<_>>().join(", ");
    if values.len() > max {
        format!("{} ... and {} more", shown, values.len() - max)
    } else {
        shown
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Report plus the comparison table as a list of row objects
    pub fn format_report(
        report: &ConsolidatedReport,
        comparison: Option<&Table>,
    ) -> Result<String> {
        let json = serde_json::json!({
            "report": report,
            "comparison": comparison.map(table_to_json),
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

fn table_to_json(table: &Table) -> serde_json::Value {
    let names = table.column_names();
    let rows = (0..table.row_count())
        .filter_map(|i| table.row(i))
        .map(|row| {
            let object: serde_json::Map<String, serde_json::Value> = names
                .iter()
                .zip(row)
                .map(|(name, value)| (name.to_string(), value_to_json(value)))
                .collect();
            serde_json::Value::Object(object)
        })
        .collect();
    serde_json::Value::Array(rows)
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        // NaN and infinities have no JSON form
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
    }
}

/// Renders and writes the self-contained HTML report
pub struct HtmlExporter {
    config: ExportConfig,
}

impl HtmlExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// `path` with `.html` appended when it does not already end in it
    pub fn html_path<P: AsRef<Path>>(path: P) -> PathBuf {
        let path = path.as_ref();
        let is_html = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("html"))
            .unwrap_or(false);
        if is_html {
            path.to_path_buf()
        } else {
            let mut name = path.as_os_str().to_os_string();
            name.push(".html");
            PathBuf::from(name)
        }
    }

    /// Write the report to `path`.
    ///
    /// Returns `Ok(false)` and leaves an existing file untouched unless
    /// `overwrite` is set.
    pub fn export<P: AsRef<Path>>(
        &self,
        report: &ConsolidatedReport,
        comparison: Option<&Table>,
        path: P,
        overwrite: bool,
    ) -> Result<bool> {
        let path = Self::html_path(path);

        if path.exists() && !overwrite {
            println!("File already exists: {}", path.display());
            log::warn!("Refusing to overwrite existing report {}", path.display());
            return Ok(false);
        }

        let html = self.render(report, comparison);

        let mut options = OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let mut file = options.open(&path)?;
        file.write_all(html.as_bytes())?;

        println!("{} saved successfully.", path.display());
        log::info!("Saved HTML report to {}", path.display());
        Ok(true)
    }

    pub fn render(&self, report: &ConsolidatedReport, comparison: Option<&Table>) -> String {
        let title = self
            .config
            .title
            .as_deref()
            .unwrap_or(&report.meta.title_text);

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(html, "<title>{}</title>", escape_html(title));
        let _ = writeln!(html, "<style>{}</style>", STYLE);
        html.push_str("</head>\n<body>\n");

        let _ = writeln!(html, "<h1 class=\"mainTitle\">{}</h1>", escape_html(title));
        html.push_str(
            "<p class=\"descriptionText\">Summary comparison of changes between two tables</p>\n",
        );
        if let Some(subset) = &report.meta.column_subset {
            let _ = writeln!(
                html,
                "<p class=\"descriptionText\">Subset of Columns Selected: {}</p>",
                escape_html(&subset.join(", "))
            );
        }
        let _ = writeln!(
            html,
            "<p class=\"reportDate\">{}</p>",
            escape_html(&report.meta.report_date)
        );

        html.push_str("<div class=\"summaries\">\n");
        self.render_table_summary(&mut html, "Old Table Summary", &report.old_df_table_summary);
        self.render_table_summary(&mut html, "New Table Summary", &report.new_df_table_summary);
        html.push_str("</div>\n");

        self.render_section(&mut html, &report.column_name_changes, String::new());
        self.render_section(&mut html, &report.record_count_changes, String::new());

        let datatype_table = report
            .datatype_changes
            .details
            .as_ref()
            .map(|d| {
                format!(
                    "<h4 class=\"detailTitle\">Summary of Datatype Changes</h4>\n{}",
                    summary_table_html(&d.summary_table, usize::MAX)
                )
            })
            .unwrap_or_default();
        self.render_section(&mut html, &report.datatype_changes, datatype_table);

        let value_table = report
            .record_value_changes
            .details
            .as_ref()
            .map(|d| {
                format!(
                    "<h4 class=\"detailTitle\">Proportion of Records that have Changed for Each Column</h4>\n{}",
                    summary_table_html(&d.summary_table, self.config.max_value_change_rows)
                )
            })
            .unwrap_or_default();
        self.render_section(&mut html, &report.record_value_changes, value_table);

        html.push_str("<div class=\"section\">\n<h3 class=\"sectionTitle\">Comparison of Changed Records</h3>\n");
        match comparison {
            Some(table) => html.push_str(&data_table_html(table, self.config.max_comparison_rows)),
            None => html.push_str("<div class=\"contentFormat\">There are no record changes</div>\n"),
        }
        html.push_str("</div>\n</body>\n</html>\n");
        html
    }

    fn render_table_summary(&self, html: &mut String, heading: &str, summary: &TableSummary) {
        let _ = writeln!(html, "<div class=\"tableSummary\">\n<h3 class=\"sectionTitle\">{}</h3>", heading);
        let _ = writeln!(
            html,
            "<p>Number of Records: {} | Number of Columns: {}</p>",
            summary.number_of_records, summary.number_of_columns
        );
        let _ = writeln!(
            html,
            "<p>Primary Key: {} | Primary Key Is Unique: {}</p>",
            escape_html(&summary.primary_key),
            summary.is_primary_key_unique
        );
        html.push_str(&summary_table_html(&summary.summary_table, usize::MAX));
        html.push_str("</div>\n");
    }

    /// Bullets, an optional section-specific table, then a sample of each value list
    fn render_section(&self, html: &mut String, section: &dyn ReportSection, extra: String) {
        let _ = writeln!(
            html,
            "<div class=\"section\">\n<h3 class=\"sectionTitle\">{}</h3>",
            section.title()
        );

        if section.is_equal() {
            let _ = writeln!(
                html,
                "<div class=\"contentFormat\">{}</div>",
                section.equal_message()
            );
        } else {
            html.push_str("<ul class=\"contentFormat\">\n");
            for bullet in section.summary() {
                let _ = writeln!(html, "<li>{}</li>", escape_html(bullet));
            }
            html.push_str("</ul>\n");
            html.push_str(&extra);

            for (category, values) in section.values() {
                let shown: Vec<String> = values
                    .iter()
                    .take(self.config.max_detail_values)
                    .map(|v| escape_html(v))
                    .collect();
                let _ = writeln!(
                    html,
                    "<h4 class=\"detailTitle\">{}</h4>\n<div class=\"detailValues\">{}</div>",
                    category.header(),
                    shown.join(", ")
                );
            }
        }

        html.push_str("</div>\n");
    }
}

fn summary_table_html<R: SummaryRow>(rows: &[R], max_rows: usize) -> String {
    let mut html = String::from("<table>\n<tr>");
    for header in R::headers() {
        let _ = write!(html, "<th>{}</th>", escape_html(header));
    }
    html.push_str("</tr>\n");
    for row in rows.iter().take(max_rows) {
        html.push_str("<tr>");
        for cell in row.cells() {
            let _ = write!(html, "<td>{}</td>", escape_html(&cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
    html
}

fn data_table_html(table: &Table, max_rows: usize) -> String {
    let mut html = String::from("<table>\n<tr>");
    for name in table.column_names() {
        let _ = write!(html, "<th>{}</th>", escape_html(name));
    }
    html.push_str("</tr>\n");
    for i in 0..table.row_count().min(max_rows) {
        if let Some(row) = table.row(i) {
            html.push_str("<tr>");
            for value in row {
                let _ = write!(html, "<td>{}</td>", escape_html(&value.to_string()));
            }
            html.push_str("</tr>\n");
        }
    }
    html.push_str("</table>\n");
    html
}

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const STYLE: &str = "\
body { font-family: Lato, Roboto, sans-serif; margin: 2em auto; max-width: 1200px; color: #222; }
.mainTitle { text-align: center; }
.descriptionText, .reportDate { display: block; text-align: center; color: #555; }
.summaries { display: flex; gap: 2em; }
.tableSummary { flex: 1; }
.section { margin-top: 2em; }
.sectionTitle { text-align: center; }
.detailTitle { text-align: center; color: #444; }
.contentFormat { text-align: center; }
.detailValues { background: #eee; padding: 0.75em; border-radius: 4px; word-wrap: break-word; }
table { border-collapse: collapse; margin: 1em auto; }
th, td { border: 1px solid #ccc; padding: 0.3em 0.8em; text-align: center; }
tr:nth-child(even) { background: #f6f6f6; }
";
