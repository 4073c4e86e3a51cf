//! Terminal UI utilities.
//!
//! A box-drawn table sized to the terminal, used for the run summary.
//!
//! ## Example
//!
//! ```rust
//! use bytebuddy_upgrade::ui::Table;
//!
//! let mut table = Table::new(&["Artifact", "Size"]);
//! table.add_row(vec!["byte-buddy-dep-1.12.6.jar".to_string(), "3.4 MiB".to_string()]);
//! table.print();
//! ```

use colored::*;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are ignored.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    pub fn print(&self) {
        let (_height, width) = console::Term::stdout().size();
        for line in self.render(width as usize) {
            println!("{}", line);
        }
    }

    /// Lays the table out within `max_width` columns. The widest column is
    /// shrunk first, but never below 8 characters.
    pub fn render(&self, max_width: usize) -> Vec<String> {
        if self.headers.is_empty() {
            return Vec::new();
        }

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = console::measure_text_width(&flatten(cell));
                widths[i] = widths[i].max(len);
            }
        }

        // 2 indent + 1 left border + 3 per column (padding and right border)
        let overhead = 3 + 3 * widths.len();
        let available = max_width.saturating_sub(overhead);
        while widths.iter().sum::<usize>() > available {
            let (idx, &widest) = match widths.iter().enumerate().max_by_key(|(_, w)| **w) {
                Some(found) => found,
                None => break,
            };
            if widest <= 8 {
                break;
            }
            widths[idx] -= 1;
        }

        let border = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}", left, segments.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| {
            let mut out = String::from("  │");
            for (cell, width) in cells.iter().zip(&widths) {
                let text = console::truncate_str(&flatten(cell), *width, "...").to_string();
                let padding = width.saturating_sub(console::measure_text_width(&text));
                let text = if bold { text.bold().to_string() } else { text };
                out.push_str(&format!(" {}{} │", text, " ".repeat(padding)));
            }
            out
        };

        let mut lines = vec![border("┌", "┬", "┐"), line(&self.headers, true)];
        lines.push(border("├", "┼", "┤"));
        for row in &self.rows {
            lines.push(line(row, false));
        }
        lines.push(border("└", "┴", "┘"));
        lines
    }
}

/// Formats a byte count with binary units, e.g. `3.4 MiB`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

fn flatten(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_has_borders_and_rows() {
        colored::control::set_override(false);
        let mut table = Table::new(&["Artifact", "Size"]);
        table.add_row(vec!["a.jar".to_string(), "1 B".to_string()]);
        let lines = table.render(80);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("  ┌"));
        assert!(lines[1].contains("Artifact"));
        assert!(lines[3].contains("a.jar"));
        assert!(lines[4].ends_with("┘"));
    }

    #[test]
    fn test_mismatched_row_is_ignored() {
        let mut table = Table::new(&["Artifact", "Size"]);
        table.add_row(vec!["only-one".to_string()]);
        assert_eq!(table.render(80).len(), 4);
    }

    #[test]
    fn test_narrow_terminal_truncates() {
        colored::control::set_override(false);
        let mut table = Table::new(&["Artifact", "Size"]);
        table.add_row(vec![
            "byte-buddy-agent-1.12.6-sources.jar".to_string(),
            "10.0 KiB".to_string(),
        ]);
        let lines = table.render(30);
        assert!(lines[3].contains("..."));
        assert!(console::measure_text_width(&lines[3]) <= 30);
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(12), "12 B");
        assert_eq!(human_size(2048), "2.0 KiB");
        assert_eq!(human_size(3 * 1024 * 1024 + 512 * 1024), "3.5 MiB");
    }
}
