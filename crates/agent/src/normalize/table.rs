use std::ops::Range;

use super::inline::decorate;

/// Locates pipe-table blocks in a reply, as half-open line ranges.
pub trait TableDetector: Send + Sync {
    /// Ranges must be ascending and non-overlapping.
    fn detect(&self, lines: &[&str]) -> Vec<Range<usize>>;
}

/// Maximal runs of at least two lines that begin and end with `|`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PipeTableDetector;

pub const MIN_TABLE_LINES: usize = 2;

pub fn is_table_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|')
}

impl TableDetector for PipeTableDetector {
    fn detect(&self, lines: &[&str]) -> Vec<Range<usize>> {
        let mut blocks = Vec::new();
        let mut start = None;

        for (index, line) in lines.iter().enumerate() {
            match (is_table_line(line), start) {
                (true, None) => start = Some(index),
                (false, Some(begin)) => {
                    if index - begin >= MIN_TABLE_LINES {
                        blocks.push(begin..index);
                    }
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(begin) = start {
            if lines.len() - begin >= MIN_TABLE_LINES {
                blocks.push(begin..lines.len());
            }
        }
        blocks
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableBlock {
    rows: Vec<Vec<String>>,
}

impl TableBlock {
    /// Parses raw table lines. Separator rows are dropped, cells are trimmed
    /// and decorated, ragged rows are padded with empty cells.
    pub fn parse(lines: &[&str]) -> Self {
        let mut rows: Vec<Vec<String>> = lines
            .iter()
            .map(|line| split_cells(line))
            .filter(|cells| !is_separator_row(cells))
            .map(|cells| cells.into_iter().map(decorate).collect())
            .collect();

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(columns, String::new());
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_widths(&self) -> Vec<usize> {
        let columns = self.rows.first().map(Vec::len).unwrap_or(0);
        (0..columns)
            .map(|column| {
                self.rows.iter().map(|row| row[column].chars().count()).max().unwrap_or(0)
            })
            .collect()
    }

    /// Header row, synthesized separator, then body rows. Empty when every
    /// input line was a separator.
    pub fn render(&self) -> Vec<String> {
        let widths = self.column_widths();
        let mut lines = Vec::with_capacity(self.rows.len() + 1);

        for (index, row) in self.rows.iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .zip(widths.iter().copied())
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect();
            lines.push(format!("| {} |", cells.join(" | ")));

            if index == 0 {
                let dashes: Vec<String> = widths.iter().map(|width| "-".repeat(width + 2)).collect();
                lines.push(format!("|{}|", dashes.join("|")));
            }
        }
        lines
    }
}

fn split_cells(line: &str) -> Vec<&str> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(str::trim).collect()
}

fn is_separator_row(cells: &[&str]) -> bool {
    cells.iter().all(|cell| cell.chars().all(|c| c == '-' || c == ':'))
        && cells.iter().any(|cell| cell.contains('-'))
}

#[cfg(test)]
mod tests {
    use super::{PipeTableDetector, TableBlock, TableDetector};

    #[test]
    fn detects_maximal_runs_of_two_or_more_lines() {
        let lines = [
            "intro",
            "| a | b |",
            "|---|---|",
            "| 1 | 2 |",
            "",
            "| lonely |",
            "text",
            "  |x|",
            "|y|",
        ];
        assert_eq!(PipeTableDetector.detect(&lines), vec![1..4, 7..9]);
    }

    #[test]
    fn single_pipe_is_not_a_table_line() {
        assert!(PipeTableDetector.detect(&["|", "|"]).is_empty());
    }

    #[test]
    fn parse_drops_separators_and_pads_ragged_rows() {
        let block = TableBlock::parse(&["| Crop | Yield | Notes |", "|:--|--:|", "| Rice | 4 |"]);
        assert_eq!(
            block.rows(),
            &[
                vec!["Crop".to_string(), "Yield".to_string(), "Notes".to_string()],
                vec!["Rice".to_string(), "4".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn render_aligns_columns_under_synthesized_separator() {
        let block = TableBlock::parse(&["|Crop|Season|", "|---|---|", "|Sugarcane|Kharif|"]);
        assert_eq!(
            block.render(),
            vec![
                "| Crop      | Season |".to_string(),
                "|-----------|--------|".to_string(),
                "| Sugarcane | Kharif |".to_string(),
            ]
        );
    }

    #[test]
    fn widths_are_measured_after_decoration_in_characters() {
        let block = TableBlock::parse(&["| Factor | Range |", "| Temperature | 20–25°C |"]);
        assert_eq!(block.column_widths(), vec![15, 9]);

        let rendered = block.render();
        let lengths: Vec<usize> = rendered.iter().map(|line| line.chars().count()).collect();
        assert!(lengths.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(rendered[2], "| **Temperature** | `20-25°C` |");
    }

    #[test]
    fn separator_only_table_renders_nothing() {
        let block = TableBlock::parse(&["|---|", "|:-:|"]);
        assert!(block.render().is_empty());
    }
}
