// src/reformat.rs
//! Source-specific post-processing of filtered lines.

use crate::config::Labels;
use crate::error::SourceError;

/// HUJI: drop surrounding periods, keep the text after the last `'`.
pub fn huji_line(line: &str) -> String {
    let t = line.trim_matches('.');
    t.rsplit('\'').next().unwrap_or(t).to_string()
}

pub fn huji_lines(lines: Vec<String>) -> Vec<String> {
    lines.iter().map(|l| huji_line(l)).collect()
}

/// TECH: one table cell laid out as value / label / secondary value.
pub fn tech_lines(blocks: &[String], labels: &Labels) -> Result<Vec<String>, SourceError> {
    let cell = blocks
        .first()
        .ok_or(SourceError::MalformedTable { found: 0 })?;
    let raw: Vec<&str> = cell.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    if raw.len() < 3 {
        return Err(SourceError::MalformedTable { found: raw.len() });
    }
    Ok(vec![
        format!("{}{}{}", raw[1], labels.separator, raw[0]),
        raw[2].to_string(),
    ])
}

/// TAU: split the registration comments into fragments that carry a digit.
///
/// Tag stripping is literal: `&nbsp;`, `<` and `//` are removed and the text is cut
/// on `p>`. Residual entities in each kept fragment are then decoded.
pub fn tau_fragments(comments: &str) -> Vec<String> {
    comments
        .replace("&nbsp;", "")
        .replace('<', "")
        .replace("//", "")
        .split("p>")
        .filter(|frag| frag.chars().any(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

pub fn tau_lines(fragments: Vec<String>) -> Vec<String> {
    fragments
        .iter()
        .map(|f| html_escape::decode_html_entities(f.trim_matches('/')).to_string())
        .collect()
}

/// BGU: `[sekem, and_or, psycho]` field values folded into one line.
pub fn bgu_line(values: &[String], labels: &Labels) -> Result<String, SourceError> {
    let [sekem, and_or, psycho] = values else {
        return Err(SourceError::MissingField(format!(
            "expected 3 fields, got {}",
            values.len()
        )));
    };
    Ok(format!(
        "{}{} {}{}{}",
        labels.threshold,
        sekem,
        and_or.trim(),
        labels.psychometric,
        psycho
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huji_keeps_last_quoted_segment() {
        assert_eq!(
            huji_line("ציון הסף לשנת תשפ\"ה: '21.500."),
            "21.500"
        );
        assert_eq!(huji_line("no quotes 22.100."), "no quotes 22.100");
        assert_eq!(huji_line("a 'b' c"), " c");
    }

    #[test]
    fn tech_rebuilds_label_value() {
        let out = tech_lines(&["valueA\nlabelB\nvalueC".to_string()], &Labels::default()).unwrap();
        assert_eq!(out, vec!["labelB: valueA", "valueC"]);
    }

    #[test]
    fn tech_ignores_extra_lines_and_cr() {
        let out = tech_lines(&["1\r\n2\r\n3\r\n4".to_string()], &Labels::default()).unwrap();
        assert_eq!(out, vec!["2: 1", "3"]);
    }

    #[test]
    fn tech_short_cell_is_error() {
        let err = tech_lines(&["a\nb".to_string()], &Labels::default()).unwrap_err();
        assert_eq!(err, SourceError::MalformedTable { found: 2 });
        let err = tech_lines(&[], &Labels::default()).unwrap_err();
        assert_eq!(err, SourceError::MalformedTable { found: 0 });
    }

    #[test]
    fn tau_strips_markup_artifacts() {
        let comments = "<p>&nbsp;Welcome</p><p>Threshold 712.50 &amp; up</p><p>https://x.test/a</p><p>Updated 2026</p>";
        let out = tau_lines(tau_fragments(comments));
        assert_eq!(out, vec!["Threshold 712.50 & up", "Updated 2026"]);
    }

    #[test]
    fn tau_digit_filter_is_ascii_only() {
        let out = tau_fragments("<p>½ מקום</p><p>Ⅻ</p><p>סף 705.10</p>");
        assert_eq!(out, vec!["סף 705.10/"]);
    }

    #[test]
    fn bgu_synthetic_line() {
        let values = vec!["570".to_string(), " and ".to_string(), "630".to_string()];
        let out = bgu_line(&values, &Labels::default()).unwrap();
        assert_eq!(out, "Threshold: 570 and Psychometric: 630");
    }
}
