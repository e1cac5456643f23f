// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Table regions in a native text layer.
//
// A line with at least two `|` or tab separators is a table line; a run of
// two or more such lines (blank lines allowed in between) is one table.

use pagesift_core::types::TableData;

/// Minimum rows for a run of table lines to count as a table.
const MIN_TABLE_ROWS: usize = 2;

pub fn is_table_line(line: &str) -> bool {
    line.matches('|').count() + line.matches('\t').count() >= 2
}

/// Split a table line into trimmed cells, dropping empty edge cells.
pub fn split_cells(line: &str) -> Vec<String> {
    let separator = if line.contains('|') { '|' } else { '\t' };
    let mut cells: Vec<String> = line.split(separator).map(|c| c.trim().to_owned()).collect();
    while cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    while cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

pub fn detect_tables(text: &str) -> Vec<TableData> {
    let mut tables = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    let mut flush = |rows: &mut Vec<Vec<String>>| {
        if rows.len() >= MIN_TABLE_ROWS {
            tables.push(TableData::new(std::mem::take(rows)));
        } else {
            rows.clear();
        }
    };

    for line in text.lines() {
        // Raw line: tabs are separators, so only spaces are trimmed here.
        let line = line.trim_matches(' ');
        if line.trim().is_empty() {
            continue;
        }
        if is_table_line(line) {
            let cells = split_cells(line);
            if !cells.is_empty() {
                rows.push(cells);
            }
        } else {
            flush(&mut rows);
        }
    }
    flush(&mut rows);

    tables
}
