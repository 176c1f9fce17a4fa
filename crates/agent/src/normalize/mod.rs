//! Markdown clean-up for language-model replies.
//!
//! Replies arrive with inconsistent emphasis, ragged pipe tables and mixed
//! list markers. [`ResponseNormalizer`] rewrites them into one canonical
//! shape:
//!
//! 1. strip `**` and `##` markers (CRLF folded to LF)
//! 2. find table blocks through a [`TableDetector`]
//! 3. re-render each table with aligned columns and a fresh separator row
//! 4. canonicalize bullet and numbered list markers
//! 5. bold agronomic keywords outside inline code
//! 6. wrap measured values (`°C`, `mm`, `days`) in inline code
//! 7. give heading blocks a leading blank line
//! 8. collapse runs of blank lines and trim
//!
//! The normalizer is pure and total: any input produces output, and running
//! it on its own output changes nothing for well-formed tables.

mod inline;
mod table;

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

pub use inline::decorate;
pub use table::{is_table_line, PipeTableDetector, TableBlock, TableDetector};

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*[-*•][ \t]*").expect("bullet regex is valid"));

static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*([0-9]+)\.([ \t]*)").expect("numbered regex is valid"));

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank run regex is valid"));

#[derive(Clone, Debug, Default)]
pub struct ResponseNormalizer<D = PipeTableDetector> {
    detector: D,
}

impl ResponseNormalizer<PipeTableDetector> {
    pub fn new() -> Self {
        Self::with_detector(PipeTableDetector)
    }
}

impl<D> ResponseNormalizer<D>
where
    D: TableDetector,
{
    pub fn with_detector(detector: D) -> Self {
        Self { detector }
    }

    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let stripped = strip_markers(text);
        let lines: Vec<&str> = stripped.split('\n').collect();
        let formatted = self.format_lines(&lines);
        let spaced = space_headings(&formatted);
        BLANK_RUN_RE.replace_all(&spaced, "\n\n").trim().to_string()
    }

    /// An absent reply stays absent.
    pub fn normalize_optional(&self, text: Option<&str>) -> Option<String> {
        text.map(|text| self.normalize(text))
    }

    fn format_lines(&self, lines: &[&str]) -> String {
        let mut output: Vec<String> = Vec::with_capacity(lines.len() + 4);
        let mut cursor = 0;

        for block in self.detector.detect(lines) {
            if block.start < cursor || block.end > lines.len() || block.is_empty() {
                continue;
            }
            output.extend(lines[cursor..block.start].iter().map(|line| format_prose_line(line)));

            let rendered = TableBlock::parse(&lines[block.clone()]).render();
            if !rendered.is_empty() {
                output.extend(rendered);
                output.push(String::new());
            }
            cursor = block.end;
        }
        output.extend(lines[cursor..].iter().map(|line| format_prose_line(line)));

        output.join("\n")
    }
}

/// Repeats until no marker is left, so removal never exposes a new one.
fn strip_markers(text: &str) -> Cow<'_, str> {
    let mut current = Cow::Borrowed(text);
    while current.contains("\r\n") || current.contains("**") || current.contains("##") {
        current = Cow::Owned(current.replace("\r\n", "\n").replace("**", "").replace("##", ""));
    }
    current
}

fn format_prose_line(line: &str) -> String {
    decorate(&canonical_list_marker(line))
}

fn canonical_list_marker(line: &str) -> Cow<'_, str> {
    if let Some(marker) = BULLET_RE.find(line) {
        return Cow::Owned(format!("* {}", &line[marker.end()..]));
    }

    if let Some(captures) = NUMBERED_RE.captures(line) {
        let whole = captures.get(0).map(|m| m.end()).unwrap_or(0);
        let rest = &line[whole..];
        let spaced = captures.get(2).is_some_and(|gap| !gap.as_str().is_empty());
        // `3.5 t/ha` is a number, not a list item.
        let decimal = !spaced && rest.starts_with(|c: char| c.is_ascii_digit());
        if !decimal && !rest.is_empty() {
            return Cow::Owned(format!("{}. {rest}", &captures[1]));
        }
    }

    Cow::Borrowed(line)
}

fn space_headings(text: &str) -> String {
    text.split("\n\n")
        .map(|block| {
            if block.starts_with('#') {
                Cow::Owned(format!("\n{block}"))
            } else {
                Cow::Borrowed(block)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use std::ops::Range;

    use proptest::prelude::*;

    use super::{ResponseNormalizer, TableDetector};

    fn normalize(text: &str) -> String {
        ResponseNormalizer::new().normalize(text)
    }

    #[test]
    fn empty_and_absent_inputs() {
        let normalizer = ResponseNormalizer::new();
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize_optional(None), None);
        assert_eq!(normalizer.normalize_optional(Some("  ")), Some(String::new()));
    }

    #[test]
    fn strips_emphasis_and_heading_markers() {
        assert_eq!(normalize("## Overview\r\n**Note** this"), "Overview\nNote this");
        assert_eq!(normalize("*##*keep"), "keep");
    }

    #[test]
    fn canonicalizes_list_markers() {
        let raw = "- first\n•second\n  *   third\n1.fourth\n2.   fifth\n3.5 tonnes per hectare";
        assert_eq!(
            normalize(raw),
            "* first\n* second\n* third\n1. fourth\n2. fifth\n3.5 tonnes per hectare"
        );
    }

    #[test]
    fn decorates_keywords_and_units_in_prose() {
        assert_eq!(
            normalize("Temperature should stay within 20–30°C for 90-120 days."),
            "**Temperature** should stay within `20-30°C` for `90-120 days`."
        );
    }

    #[test]
    fn rebuilds_tables_and_separates_them_from_following_text() {
        let raw = "Comparison:\n|Crop|Water Needs|\n|--|--|\n|Rice|1200 mm|\n|Millet|350mm|\nPick millet.";
        let expected = "Comparison:\n\
| Crop   | **Water Needs** |\n\
|--------|-----------------|\n\
| Rice   | `1200 mm`       |\n\
| Millet | `350mm`         |\n\
\n\
Pick millet.";
        assert_eq!(normalize(raw), expected);
    }

    #[test]
    fn collapses_blank_runs_and_trims() {
        assert_eq!(normalize("\n\n  a\n\n\n\n\nb  \n\n"), "a\n\nb");
    }

    #[test]
    fn headings_keep_a_single_blank_line_before_them() {
        assert_eq!(normalize("intro\n\n### Sowing\nsteps"), "intro\n\n# Sowing\nsteps");
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let raw = "## Guide\n- Soil Type: loamy\n| Stage | Days |\n|---|---|\n| Tillering | 20-25 days |\n\n\n\nDone";
        let once = normalize(raw);
        assert_eq!(normalize(&once), once);
    }

    struct NoTables;

    impl TableDetector for NoTables {
        fn detect(&self, _lines: &[&str]) -> Vec<Range<usize>> {
            Vec::new()
        }
    }

    #[test]
    fn custom_detector_controls_table_handling() {
        let normalizer = ResponseNormalizer::with_detector(NoTables);
        assert_eq!(normalizer.normalize("|a|b|\n|c|d|"), "|a|b|\n|c|d|");
    }

    struct Overlapping;

    impl TableDetector for Overlapping {
        fn detect(&self, _lines: &[&str]) -> Vec<Range<usize>> {
            vec![0..2, 1..3, 2..99]
        }
    }

    #[test]
    fn out_of_order_or_out_of_range_blocks_are_ignored() {
        let normalizer = ResponseNormalizer::with_detector(Overlapping);
        assert_eq!(normalizer.normalize("|a|\n|b|\n- c"), "| a |\n|---|\n| b |\n\n* c");
    }

    fn table_text() -> impl Strategy<Value = String> {
        (1usize..5, 1usize..6)
            .prop_flat_map(|(columns, rows)| {
                prop::collection::vec(
                    prop::collection::vec("[A-Za-z0-9 ]{0,10}", columns),
                    rows + 1,
                )
            })
            .prop_map(|rows| {
                let mut lines = Vec::with_capacity(rows.len() + 1);
                for (index, row) in rows.iter().enumerate() {
                    lines.push(format!("|{}|", row.join("|")));
                    if index == 0 {
                        lines.push(format!("|{}|", vec!["---"; row.len()].join("|")));
                    }
                }
                lines.join("\n")
            })
    }

    proptest! {
        #[test]
        fn normalize_is_total(text in any::<String>()) {
            let output = normalize(&text);
            prop_assert!(!output.contains("\n\n\n"));
            prop_assert_eq!(output.trim(), output.as_str());
        }

        #[test]
        fn tables_are_a_fixed_point(
            before in "[A-Za-z ,.]{0,30}",
            table in table_text(),
            after in "[A-Za-z ,.]{0,30}",
        ) {
            let raw = format!("{before}\n{table}\n{after}");
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once.clone());

            let widths: Vec<usize> = once
                .lines()
                .filter(|line| line.starts_with('|'))
                .map(|line| line.chars().count())
                .collect();
            prop_assert!(widths.len() >= 3);
            prop_assert!(widths.windows(2).all(|pair| pair[0] == pair[1]));
        }
    }
}
