//! Inline rewrites shared by prose lines and table cells.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Temperature|Water Needs|Days to Harvest|Soil Type|pH|Growing Season)\b")
        .expect("keyword regex is valid")
});

static UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([0-9]+(?:\.[0-9]+)?)(?:[ ]?[-–][ ]?([0-9]+(?:\.[0-9]+)?))?( ?)(°C|mm|days)\b")
        .expect("unit regex is valid")
});

/// Bolds agronomic keywords and wraps measured values in inline code.
pub fn decorate(text: &str) -> String {
    let emphasized = outside_code(text, emphasize_keywords);
    outside_code(&emphasized, annotate_units)
}

fn emphasize_keywords(segment: &str) -> Cow<'_, str> {
    KEYWORD_RE.replace_all(segment, "**$1**")
}

fn annotate_units(segment: &str) -> Cow<'_, str> {
    UNIT_RE.replace_all(segment, |captures: &Captures<'_>| {
        let value = match captures.get(2) {
            Some(upper) => format!("{}-{}", &captures[1], upper.as_str()),
            None => captures[1].to_string(),
        };
        format!("`{value}{}{}`", &captures[3], &captures[4])
    })
}

/// Applies `rewrite` to the text between inline code spans. An unmatched
/// backtick opens a span that runs to the end of `text`.
fn outside_code<F>(text: &str, rewrite: F) -> String
where
    F: for<'a> Fn(&'a str) -> Cow<'a, str>,
{
    if !text.contains('`') {
        return rewrite(text).into_owned();
    }

    let mut output = String::with_capacity(text.len() + 16);
    for (index, segment) in text.split('`').enumerate() {
        if index > 0 {
            output.push('`');
        }
        if index % 2 == 0 {
            output.push_str(&rewrite(segment));
        } else {
            output.push_str(segment);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::decorate;

    #[test]
    fn bolds_whole_word_keywords_only() {
        assert_eq!(decorate("Soil Type: loam"), "**Soil Type**: loam");
        assert_eq!(decorate("ideal pH range"), "ideal **pH** range");
        assert_eq!(decorate("pHosphate and Temperatures"), "pHosphate and Temperatures");
    }

    #[test]
    fn wraps_single_values_and_ranges() {
        assert_eq!(decorate("keep it at 25°C"), "keep it at `25°C`");
        assert_eq!(decorate("needs 500 mm of rain"), "needs `500 mm` of rain");
        assert_eq!(decorate("ready in 90-120 days"), "ready in `90-120 days`");
        assert_eq!(decorate("between 18–24°C"), "between `18-24°C`");
        assert_eq!(decorate("apply 2.5mm"), "apply `2.5mm`");
    }

    #[test]
    fn unit_must_end_on_a_word_boundary() {
        assert_eq!(decorate("3 mmol of salt"), "3 mmol of salt");
        assert_eq!(decorate("x25°C"), "x25°C");
    }

    #[test]
    fn only_ascii_digits_start_a_value() {
        assert_eq!(decorate("२५°C, then 30°C"), "२५°C, then `30°C`");
    }

    #[test]
    fn leaves_existing_code_spans_alone() {
        assert_eq!(decorate("`Temperature` is 30°C"), "`Temperature` is `30°C`");
        assert_eq!(decorate("already `25°C` here"), "already `25°C` here");
        assert_eq!(decorate("open ` 25°C pH"), "open ` 25°C pH");
    }

    #[test]
    fn decoration_is_stable_once_markers_are_stripped() {
        let once = decorate("Temperature: 20-25°C, Water Needs: 600 mm");
        let again = decorate(&once.replace("**", ""));
        assert_eq!(once, again);
        assert_eq!(once, "**Temperature**: `20-25°C`, **Water Needs**: `600 mm`");
    }
}
