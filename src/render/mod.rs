//! Verdict presentation: human table or machine-readable JSON.

use anyhow::Result;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use serde_json::Value;
use std::io::Write;

use crate::verify::{PackageVerdict, Verdict};

/// Contributes extra columns to each rendered row, independent of core
/// verdict computation. Absence is the default, not a null check.
pub trait VerdictEnricher {
    /// Header names for the contributed columns, in order.
    fn columns(&self) -> Vec<String>;
    /// Key/value pairs to append to one row, one per contributed column.
    fn enrich(&self, verdict: &PackageVerdict) -> Vec<(String, Value)>;
}

pub struct RenderOptions {
    pub json: bool,
    pub skip_match: bool,
    pub enricher: Option<Box<dyn VerdictEnricher>>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            json: false,
            skip_match: false,
            enricher: None,
        }
    }
}

const BASE_COLUMNS: [&str; 6] = [
    "Status",
    "Package",
    "Version",
    "Package ID",
    "Checksum",
    "Percentage",
];

/// Renders the complete verdict set. The skip-match filter is applied before
/// enrichment, identically in both output modes.
#[tracing::instrument(skip_all)]
pub fn render(
    out: &mut dyn Write,
    verdicts: &[PackageVerdict],
    options: &RenderOptions,
) -> Result<()> {
    let visible: Vec<&PackageVerdict> = verdicts
        .iter()
        .filter(|v| !(options.skip_match && v.verdict == Verdict::Match))
        .collect();

    if options.json {
        render_json(out, &visible, options.enricher.as_deref())
    } else {
        render_table(out, &visible, options.enricher.as_deref())
    }
}

fn render_json(
    out: &mut dyn Write,
    verdicts: &[&PackageVerdict],
    enricher: Option<&dyn VerdictEnricher>,
) -> Result<()> {
    let rows: Vec<Value> = verdicts
        .iter()
        .map(|verdict| {
            let mut row = serde_json::Map::new();
            row.insert("status".into(), Value::from(verdict.verdict.as_str()));
            row.insert("package".into(), Value::from(verdict.name.clone()));
            row.insert("version".into(), Value::from(verdict.version.clone()));
            row.insert("package_id".into(), Value::from(verdict.package_id.clone()));
            row.insert("checksum".into(), Value::from(verdict.checksum.clone()));
            row.insert(
                "percentage".into(),
                Value::from(verdict.percentage.unwrap_or(0.0)),
            );
            if let Some(enricher) = enricher {
                for (key, value) in enricher.enrich(verdict) {
                    row.insert(key, value);
                }
            }
            Value::Object(row)
        })
        .collect();

    writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
    Ok(())
}

fn render_table(
    out: &mut dyn Write,
    verdicts: &[&PackageVerdict],
    enricher: Option<&dyn VerdictEnricher>,
) -> Result<()> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header: Vec<Cell> = BASE_COLUMNS.iter().map(Cell::new).collect();
    if let Some(enricher) = enricher {
        header.extend(enricher.columns().iter().map(Cell::new));
    }
    table.set_header(header);

    for verdict in verdicts {
        let mut row = vec![
            status_cell(verdict.verdict),
            Cell::new(&verdict.name),
            Cell::new(&verdict.version),
            Cell::new(&verdict.package_id),
            Cell::new(&verdict.checksum),
            Cell::new(format_percentage(verdict)).set_alignment(CellAlignment::Center),
        ];
        if let Some(enricher) = enricher {
            row.extend(
                enricher
                    .enrich(verdict)
                    .into_iter()
                    .map(|(_, value)| Cell::new(display_value(&value))),
            );
        }
        table.add_row(row);
    }

    writeln!(out, "{table}")?;
    Ok(())
}

fn status_cell(verdict: Verdict) -> Cell {
    match verdict {
        Verdict::Match => Cell::new("✓").fg(Color::Green),
        Verdict::Mismatch => Cell::new("⨉").fg(Color::Red),
        Verdict::Unknown => Cell::new("?"),
    }
    .set_alignment(CellAlignment::Center)
}

fn format_percentage(verdict: &PackageVerdict) -> String {
    if verdict.verdict == Verdict::Unknown {
        return "-".to_string();
    }
    match verdict.percentage {
        Some(percentage) => format!("{}%", percentage),
        None => "-".to_string(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
