//! Plain-text and MediaWiki tables

use crate::report::Column;

const SEPARATOR: &str = "  ";

/// Left-aligned columns separated by two spaces, with a dashed rule under the headers
pub fn simple(columns: &[Column], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain([column.header().len()])
                .max()
                .unwrap_or_default()
        })
        .collect();

    let headers: Vec<String> = columns.iter().map(|c| c.header().to_string()).collect();
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();

    let mut output = String::new();
    for line in [&headers, &rule].into_iter().chain(rows) {
        output.push_str(&pad_line(line, &widths));
        output.push('\n');
    }
    output
}

fn pad_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    padded.join(SEPARATOR).trim_end().to_string()
}

/// A `wikitable` with one header row
pub fn mediawiki(columns: &[Column], rows: &[Vec<String>]) -> String {
    let mut output = String::from("{| class=\"wikitable\" style=\"text-align: left;\"\n");
    output.push_str("|-\n");

    let headers: Vec<&str> = columns.iter().map(Column::header).collect();
    output.push_str(&format!("! {}\n", headers.join(" !! ")));

    for row in rows {
        output.push_str("|-\n");
        output.push_str(format!("| {}", row.join(" || ")).trim_end());
        output.push('\n');
    }

    output.push_str("|}\n");
    output
}
