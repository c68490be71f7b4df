//! Output formatting for CLI commands

use serde::Serialize;

use crate::error::{Error, Result};

/// Print a value as pretty-printed JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Column-aligned table, buffered so widths can be computed before
/// printing.
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cols: Vec<String>) {
        self.rows.push(cols);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Print the table to stdout with two spaces between columns.
    pub fn print(&self) {
        let mut widths: Vec<usize> = self.headers.iter().map(String::len).collect();
        for row in &self.rows {
            for (i, col) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(col.len());
                }
            }
        }

        print_padded(&self.headers, &widths);
        for row in &self.rows {
            print_padded(row, &widths);
        }
    }
}

fn print_padded(cols: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, col) in cols.iter().enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        if i + 1 < cols.len() {
            let width = widths.get(i).copied().unwrap_or(0);
            line.push_str(&format!("{col:<width$}"));
        } else {
            // Last column is never padded.
            line.push_str(col);
        }
    }
    println!("{}", line.trim_end());
}

/// Write bytes to a file, or to stdout when no path is given.
pub fn write_bytes_or_stdout(path: Option<&std::path::Path>, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    match path {
        Some(path) => {
            std::fs::write(path, bytes)?;
            eprintln!("Wrote {} bytes to {}", bytes.len(), path.display());
            Ok(())
        }
        None => {
            std::io::stdout()
                .write_all(bytes)
                .map_err(Error::from)
        }
    }
}
