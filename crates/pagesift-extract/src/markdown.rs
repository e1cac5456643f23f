// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Markdown rendering of detected tables, appended to a page's text.

use pagesift_core::types::TableData;

/// Render tables as markdown, one `### Table N` block each. The first row of
/// every table is treated as its header.
pub fn tables_to_markdown(tables: &[TableData]) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (idx, table) in tables.iter().enumerate() {
        if table.rows.first().is_none_or(|row| row.is_empty()) {
            continue;
        }

        lines.push(format!("\n### Table {}\n", idx + 1));
        for (row_idx, row) in table.rows.iter().filter(|row| !row.is_empty()).enumerate() {
            let cells: Vec<&str> = row.iter().map(|cell| cell.trim()).collect();
            lines.push(format!("| {} |", cells.join(" | ")));
            if row_idx == 0 {
                lines.push(format!("| {} |", vec!["---"; cells.len()].join(" | ")));
            }
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Append rendered tables to `text`, separated by a horizontal rule.
pub fn combine_text_and_tables(text: &str, tables: &str) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(3);
    if !text.is_empty() {
        parts.push(text);
    }
    if !tables.is_empty() {
        if !parts.is_empty() {
            parts.push("\n---\n");
        }
        parts.push(tables);
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> TableData {
        TableData::new(
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn renders_header_separator_after_first_row() {
        let md = tables_to_markdown(&[table(&[&["Item", "Qty"], &[" Bolt ", "4"]])]);
        assert_eq!(
            md,
            "\n### Table 1\n\n| Item | Qty |\n| --- | --- |\n| Bolt | 4 |\n"
        );
    }

    #[test]
    fn skips_empty_tables_but_keeps_numbering() {
        let md = tables_to_markdown(&[TableData::default(), table(&[&["a", "b"]])]);
        assert!(md.contains("### Table 2"));
        assert!(!md.contains("### Table 1"));
    }

    #[test]
    fn combine_inserts_rule_between_parts() {
        assert_eq!(combine_text_and_tables("body", "| a |"), "body\n\n---\n\n| a |");
        assert_eq!(combine_text_and_tables("", "| a |"), "| a |");
        assert_eq!(combine_text_and_tables("body", ""), "body");
    }
}
