//! Text rendering for the interactive session.

use std::fmt::Write as _;

use crate::ingestion::{LoadedData, XmlDocument, XmlNode};
use crate::processing::Statistics;
use crate::types::{DataSet, RecordSet};

/// Render whatever a loader produced, showing at most `limit` rows or records.
pub fn render_loaded(data: &LoadedData, limit: Option<usize>) -> String {
    match data {
        LoadedData::Table(ds) => render_table(ds, limit),
        LoadedData::Records(rs) => render_records(rs, limit),
        LoadedData::Tree(doc) => render_xml(doc),
    }
}

/// One `field: value` line per field, records separated by a blank line.
pub fn render_records(records: &RecordSet, limit: Option<usize>) -> String {
    let shown = limit.unwrap_or(usize::MAX).min(records.record_count());
    let mut out = String::new();
    for (i, record) in records.iter().take(shown).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for (field, value) in record.iter() {
            let _ = writeln!(out, "{field}: {value}");
        }
    }
    push_truncation_note(&mut out, shown, records.record_count(), "records");
    out
}

/// Left-aligned columns with a header row. Null cells are blank.
pub fn render_table(dataset: &DataSet, limit: Option<usize>) -> String {
    let shown = limit.unwrap_or(usize::MAX).min(dataset.row_count());
    let header: Vec<String> = dataset.schema.field_names().map(str::to_owned).collect();
    let cells: Vec<Vec<String>> = dataset
        .rows
        .iter()
        .take(shown)
        .map(|row| {
            row.iter()
                .map(|v| if v.is_null() { String::new() } else { v.to_string() })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_aligned_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_aligned_line(&mut out, &rule, &widths);
    for row in &cells {
        push_aligned_line(&mut out, row, &widths);
    }
    push_truncation_note(&mut out, shown, dataset.row_count(), "rows");
    out
}

fn push_aligned_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn push_truncation_note(out: &mut String, shown: usize, total: usize, noun: &str) {
    if shown < total {
        let _ = writeln!(out, "... showing {shown} of {total} {noun}");
    }
}

/// Indented tree, one tag per line.
pub fn render_xml(doc: &XmlDocument) -> String {
    let mut out = String::new();
    push_xml_node(&mut out, &doc.root_tag, &doc.root, 0);
    out
}

fn push_xml_node(out: &mut String, tag: &str, node: &XmlNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        XmlNode::Text(Some(text)) => {
            let _ = writeln!(out, "{indent}{tag}: {text}");
        }
        XmlNode::Text(None) => {
            let _ = writeln!(out, "{indent}{tag}:");
        }
        XmlNode::Element(children) => {
            let _ = writeln!(out, "{indent}{tag}:");
            for (child_tag, child) in children {
                push_xml_node(out, child_tag, child, depth + 1);
            }
        }
        XmlNode::Repeated(items) => {
            for item in items {
                push_xml_node(out, tag, item, depth);
            }
        }
    }
}

/// Human-readable statistics, grouped by category.
pub fn render_stats(stats: &Statistics) -> String {
    let mut out = String::new();

    if !stats.numeric.is_empty() {
        out.push_str("Numeric statistics:\n");
        for (field, s) in &stats.numeric {
            let _ = writeln!(out, "  {field}:");
            let _ = writeln!(out, "    Min: {}", s.min);
            let _ = writeln!(out, "    Max: {}", s.max);
            let _ = writeln!(out, "    Average: {:.2}", s.average);
        }
    }
    if !stats.boolean.is_empty() {
        out.push_str("Boolean statistics:\n");
        for (field, s) in &stats.boolean {
            let _ = writeln!(out, "  {field}:");
            let _ = writeln!(out, "    True: {:.2}%", s.true_percentage);
            let _ = writeln!(out, "    False: {:.2}%", s.false_percentage);
        }
    }
    if !stats.list.is_empty() {
        out.push_str("List statistics:\n");
        for (field, s) in &stats.list {
            let _ = writeln!(out, "  {field}:");
            let _ = writeln!(out, "    Min size: {}", s.min_size);
            let _ = writeln!(out, "    Max size: {}", s.max_size);
            let _ = writeln!(out, "    Average size: {:.2}", s.average_size);
        }
    }
    if out.is_empty() {
        out.push_str("No statistics available.\n");
    }
    out
}

/// Statistics as pretty-printed JSON.
pub fn render_stats_json(stats: &Statistics) -> serde_json::Result<String> {
    let mut text = serde_json::to_string_pretty(stats)?;
    text.push('\n');
    Ok(text)
}
