//! Output rendering: human, csv, and json encodings.
//!
//! All three operate on the fully materialized message list; the human
//! format needs the whole set up front to compute its column widths.
//! Rendering produces a `String`, so everything stays UTF-8 until the
//! single write at the output boundary.

use anyhow::Result;
use clap::ValueEnum;

use crate::classify::ResolvedMessage;

/// Output encoding selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Pipe-delimited columns with global alignment.
    Human,
    /// Comma-separated values, every field quoted.
    Csv,
    /// Pretty-printed JSON array.
    Json,
}

/// Render the ordered message list in the selected encoding.
/// The header flag applies to human and csv only.
pub fn render(messages: &[ResolvedMessage], format: Format, header: bool) -> Result<String> {
    match format {
        Format::Human => Ok(render_human(messages, header)),
        Format::Csv => Ok(render_csv(messages, header)),
        Format::Json => render_json(messages),
    }
}

/// Column width in characters, not bytes, so non-ASCII names line up.
fn width(s: &str) -> usize {
    s.chars().count()
}

/// Widest value in one column across the whole message set, floored by the
/// column header so the header row fits the same table.
fn column_width(messages: &[ResolvedMessage], header: &str, field: fn(&ResolvedMessage) -> &str) -> usize {
    messages
        .iter()
        .map(|m| width(field(m)))
        .max()
        .unwrap_or(0)
        .max(width(header))
}

/// One pipe-delimited message per line: `date | from | to | text`.
///
/// Date and Text are left-justified, From and To right-justified. Widths
/// are fixed for the whole run, and a trailing empty line ends the output.
fn render_human(messages: &[ResolvedMessage], header: bool) -> String {
    let date_width = column_width(messages, "Date", |m| &m.date);
    let from_width = column_width(messages, "From", |m| &m.from_addr);
    let to_width = column_width(messages, "To", |m| &m.to_addr);

    let mut lines = Vec::with_capacity(messages.len() + 2);
    if header {
        lines.push(format!(
            "{:<date_width$} | {:<from_width$} | {:<to_width$} | {}",
            "Date", "From", "To", "Text"
        ));
    }
    for m in messages {
        lines.push(format!(
            "{:<date_width$} | {:>from_width$} | {:>to_width$} | {}",
            m.date, m.from_addr, m.to_addr, m.text
        ));
    }
    lines.push(String::new());
    lines.join("\n")
}

/// Quote-all CSV in the excel dialect: every field double-quoted, embedded
/// quotes doubled, CRLF record separator.
fn render_csv(messages: &[ResolvedMessage], header: bool) -> String {
    let mut out = String::new();
    if header {
        write_csv_record(&mut out, ["Date", "From", "To", "Text"]);
    }
    for m in messages {
        write_csv_record(&mut out, [&m.date, &m.from_addr, &m.to_addr, &m.text]);
    }
    out
}

fn write_csv_record(out: &mut String, fields: [&str; 4]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    }
    out.push_str("\r\n");
}

/// JSON array of `{date, from, to, text}` objects with sorted keys and
/// two-space indentation. Round-trips back into [`ResolvedMessage`]s.
fn render_json(messages: &[ResolvedMessage]) -> Result<String> {
    // Going through Value sorts object keys (its map is BTreeMap-backed).
    let value = serde_json::to_value(messages)?;
    Ok(serde_json::to_string_pretty(&value)?)
}
