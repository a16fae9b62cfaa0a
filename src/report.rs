//! Plain-text rendering of validation findings.

use std::fmt::Write as _;

use crate::findings::Findings;

/// Renders findings as a two-column table followed by a summary line.
/// A clean pass renders only the success line.
pub fn render(findings: &Findings) -> String {
    let mut out = String::new();

    if findings.is_empty() {
        out.push_str("[OK] No errors found.\n");
        return out;
    }

    let rows = findings.to_vec();
    let path_width = rows
        .iter()
        .map(|f| f.path.chars().count())
        .chain(std::iter::once("File".len()))
        .max()
        .unwrap_or(0);
    let message_width = rows
        .iter()
        .map(|f| f.message.chars().count())
        .chain(std::iter::once("Error".len()))
        .max()
        .unwrap_or(0);

    let rule = format!("+-{}-+-{}-+\n", "-".repeat(path_width), "-".repeat(message_width));
    out.push_str(&rule);
    let _ = writeln!(out, "| {:<path_width$} | {:<message_width$} |", "File", "Error");
    out.push_str(&rule);
    for row in &rows {
        let _ = writeln!(
            out,
            "| {:<path_width$} | {:<message_width$} |",
            row.path, row.message
        );
    }
    out.push_str(&rule);

    let records = findings.failed_records();
    let _ = writeln!(
        out,
        "\n[ERROR] {} {} failed validation ({} {}).",
        records,
        if records == 1 { "advisory" } else { "advisories" },
        findings.total(),
        if findings.total() == 1 { "error" } else { "errors" },
    );
    out
}
