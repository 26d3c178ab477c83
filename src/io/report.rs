//! Report renderers.
//!
//! Renderers only present a finished [`TargetReport`]; they never touch the
//! counts themselves.

use super::error::ReportError;
use crate::core::TargetReport;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tera::{Context, Tera};

/// Turns a report into a human-readable artifact.
pub trait ReportRenderer: Send {
    fn render(&mut self, report: &TargetReport) -> Result<(), ReportError>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Plain-text report for a terminal.
pub struct ConsoleRenderer<W: Write + Send> {
    out: W,
}

impl ConsoleRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Render a report whose counts were computed but not persisted.
    ///
    /// The output is marked so it cannot be mistaken for a complete run.
    pub fn render_degraded(
        &mut self,
        report: &TargetReport,
        reason: &str,
    ) -> Result<(), ReportError> {
        writeln!(self.out, "{}", "!".repeat(60))?;
        writeln!(self.out, "WARNING: results were NOT persisted ({reason})")?;
        writeln!(
            self.out,
            "The counts below are complete but exist only in this output."
        )?;
        writeln!(self.out, "{}", "!".repeat(60))?;
        self.write_body(report)?;
        self.out.flush()?;
        Ok(())
    }

    fn write_body(&mut self, report: &TargetReport) -> io::Result<()> {
        let width = report
            .targets
            .iter()
            .map(|t| t.token.chars().count())
            .max()
            .unwrap_or(0)
            .max(12);

        writeln!(self.out)?;
        writeln!(self.out, "Target words:")?;
        for target in &report.targets {
            writeln!(
                self.out,
                "   {:<width$} : {:>5} occurrences",
                target.token,
                target.count,
                width = width
            )?;
        }

        writeln!(self.out)?;
        writeln!(self.out, "Corpus statistics:")?;
        writeln!(self.out, "   Unique words:      {}", report.distinct_count)?;
        writeln!(self.out, "   Total occurrences: {}", report.total_occurrences)?;
        writeln!(self.out, "   Input lines:       {}", report.records)?;
        writeln!(self.out)?;
        writeln!(
            self.out,
            "Elapsed: {:.2} s",
            report.elapsed.as_secs_f64()
        )?;
        Ok(())
    }
}

impl<W: Write + Send> ReportRenderer for ConsoleRenderer<W> {
    fn render(&mut self, report: &TargetReport) -> Result<(), ReportError> {
        writeln!(self.out, "{}", "=".repeat(60))?;
        writeln!(self.out, "WORD COUNT RESULTS")?;
        if let Some(run_id) = report.run_id {
            writeln!(self.out, "run {run_id}")?;
        }
        writeln!(self.out, "{}", "=".repeat(60))?;
        self.write_body(report)?;
        self.out.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <style>
        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background: #f4f6f8; color: #333; padding: 20px; }
        .container { max-width: 960px; margin: 0 auto; background: white; border-radius: 12px; overflow: hidden; box-shadow: 0 10px 30px rgba(0,0,0,0.08); }
        .header { background: #2c3e50; color: white; padding: 32px; text-align: center; }
        .section { padding: 24px 32px; }
        table { width: 100%; border-collapse: collapse; margin: 16px 0; }
        th, td { padding: 12px; text-align: left; border-bottom: 1px solid #ddd; }
        th { background: #3498db; color: white; }
        .found { color: #27ae60; }
        .missing { color: #e67e22; }
        .stats { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 16px; }
        .stat-card { background: #3498db; color: white; padding: 16px; border-radius: 8px; text-align: center; }
        .stat-card p { font-size: 1.8em; margin: 8px 0; }
        .footer { background: #2c3e50; color: white; text-align: center; padding: 12px; font-size: 0.9em; }
    </style>
</head>
<body>
<div class="container">
    <div class="header">
        <h1>{{ title }}</h1>
        <p>Generated {{ generated_at }}{% if run_id %} &middot; run {{ run_id }}{% endif %}</p>
    </div>
    <div class="section">
        <h2>Target words</h2>
        <table>
            <tr><th>Word</th><th>Count</th><th>Status</th></tr>
            {% for row in targets %}
            <tr>
                <td><strong>{{ row.token }}</strong></td>
                <td>{{ row.count }}</td>
                {% if row.found %}<td class="found">Found</td>{% else %}<td class="missing">Not found</td>{% endif %}
            </tr>
            {% endfor %}
        </table>
    </div>
    <div class="section stats">
        <div class="stat-card"><h3>Unique words</h3><p>{{ distinct_count }}</p></div>
        <div class="stat-card"><h3>Total occurrences</h3><p>{{ total_occurrences }}</p></div>
        <div class="stat-card"><h3>Input lines</h3><p>{{ records }}</p></div>
        <div class="stat-card"><h3>Elapsed</h3><p>{{ elapsed }}</p></div>
    </div>
    <div class="footer">tokenize &rarr; partition aggregate &rarr; global reduce</div>
</div>
</body>
</html>
"#;

#[derive(Serialize)]
struct HtmlRow<'a> {
    token: &'a str,
    count: u64,
    found: bool,
}

/// Standalone HTML document written to a file.
#[derive(Clone, Debug)]
pub struct HtmlRenderer {
    path: PathBuf,
    title: String,
}

impl HtmlRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            title: "Word Count Report".to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Render the document without writing it.
    pub fn to_html(&self, report: &TargetReport) -> Result<String, ReportError> {
        let rows: Vec<HtmlRow<'_>> = report
            .targets
            .iter()
            .map(|t| HtmlRow {
                token: &t.token,
                count: t.count,
                found: t.found(),
            })
            .collect();

        let mut context = Context::new();
        context.insert("title", &self.title);
        context.insert("targets", &rows);
        context.insert("distinct_count", &report.distinct_count);
        context.insert("total_occurrences", &report.total_occurrences);
        context.insert("records", &report.records);
        context.insert(
            "elapsed",
            &format!("{:.2}s", report.elapsed.as_secs_f64()),
        );
        context.insert(
            "generated_at",
            &report.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
        context.insert(
            "run_id",
            &report.run_id.map(|id| id.to_string()).unwrap_or_default(),
        );

        Ok(Tera::one_off(HTML_TEMPLATE, &context, true)?)
    }
}

impl ReportRenderer for HtmlRenderer {
    fn render(&mut self, report: &TargetReport) -> Result<(), ReportError> {
        let html = self.to_html(report)?;
        write_creating_parent(&self.path, html.as_bytes())?;
        Ok(())
    }

    fn name(&self) -> &str {
        "html"
    }
}

/// The report as pretty-printed JSON, written to a file.
#[derive(Clone, Debug)]
pub struct JsonRenderer {
    path: PathBuf,
}

impl JsonRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportRenderer for JsonRenderer {
    fn render(&mut self, report: &TargetReport) -> Result<(), ReportError> {
        let json = serde_json::to_vec_pretty(report)?;
        write_creating_parent(&self.path, &json)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}

fn write_creating_parent(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}
