//! Line classification and text sanitization for formatted output.
//!
//! Briefs come back from the generation service as loosely structured
//! Markdown. Formatted renderers don't interpret Markdown; they walk the
//! brief line by line and treat each line according to a handful of literal
//! prefix rules.

use std::sync::LazyLock;

use regex::Regex;

/// Marker for a rendered sub-heading.
const HEADING_PREFIX: &str = "## ";

/// Top-level heading prefix; only used to spot the duplicated title.
const TITLE_PREFIX: &str = "# ";

/// Text identifying a title line that repeats the document title.
const DUPLICATE_TITLE_MARKER: &str = "PROSPECT BRIEF";

/// Accepted bullet markers, each followed by a space.
const BULLET_PREFIXES: [&str; 3] = ["- ", "* ", "• "];

/// Opening bold-emphasis marker.
const BOLD_MARKER: &str = "**";

/// Separator used by label lines (`**Company:** X | **Industry:** Y`).
const FIELD_SEPARATOR: char = '|';

/// A classified line of brief text. Payloads are unsanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BriefLine {
    /// Empty line; vertical spacing only.
    Blank,
    /// Sub-heading text with the marker removed.
    Heading(String),
    /// Bullet text with the marker removed.
    Bullet(String),
    /// A bold single-line label field, kept whole.
    Field(String),
    /// Any other text.
    Paragraph(String),
}

/// `# ... PROSPECT BRIEF ...` lines duplicate the document title.
pub fn is_duplicate_title(line: &str) -> bool {
    line.starts_with(TITLE_PREFIX) && line.contains(DUPLICATE_TITLE_MARKER)
}

pub fn heading_text(line: &str) -> Option<&str> {
    line.strip_prefix(HEADING_PREFIX)
}

pub fn bullet_text(line: &str) -> Option<&str> {
    BULLET_PREFIXES
        .iter()
        .find_map(|prefix| line.strip_prefix(prefix))
}

/// A label line contains a pipe and opens with bold markers.
pub fn is_field_line(line: &str) -> bool {
    line.contains(FIELD_SEPARATOR) && line.starts_with(BOLD_MARKER)
}

/// Classify one line. Returns `None` for lines that must be skipped.
///
/// Rules are checked in order: blank, duplicate title, heading, bullet,
/// field, paragraph. Surrounding whitespace is ignored.
pub fn classify_line(raw: &str) -> Option<BriefLine> {
    let line = raw.trim();

    if line.is_empty() {
        return Some(BriefLine::Blank);
    }
    if is_duplicate_title(line) {
        return None;
    }
    if let Some(text) = heading_text(line) {
        return Some(BriefLine::Heading(text.to_string()));
    }
    if let Some(text) = bullet_text(line) {
        return Some(BriefLine::Bullet(text.to_string()));
    }
    if is_field_line(line) {
        return Some(BriefLine::Field(line.to_string()));
    }
    Some(BriefLine::Paragraph(line.to_string()))
}

/// Classify every line of a brief, dropping skipped lines.
pub fn parse_brief(brief: &str) -> Vec<BriefLine> {
    brief.split('\n').filter_map(classify_line).collect()
}

// ---------------------------------------------------------------------------
// Sanitization
// ---------------------------------------------------------------------------

/// Character shown in place of anything the target font cannot encode.
pub const SUBSTITUTE_CHAR: char = '?';

/// Remove `**bold**` markup, keeping the inner text.
pub fn strip_bold(text: &str) -> String {
    static BOLD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));

    BOLD_RE.replace_all(text, "$1").into_owned()
}

/// Prepare text for a Latin-1 font: strip bold markup, normalize bullets,
/// quotes and dashes, and substitute anything still unencodable.
pub fn sanitize(text: &str) -> String {
    strip_bold(text)
        .chars()
        .map(|c| match c {
            '•' => '-',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{2013}' | '\u{2014}' => '-',
            c if u32::from(c) <= 0xFF => c,
            _ => SUBSTITUTE_CHAR,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_classify_as_blank() {
        assert_eq!(classify_line(""), Some(BriefLine::Blank));
        assert_eq!(classify_line("   \t"), Some(BriefLine::Blank));
    }

    #[test]
    fn duplicate_title_is_skipped() {
        assert_eq!(classify_line("# ACME CORP - PROSPECT BRIEF"), None);
        // Only the marked title is skipped
        assert_eq!(
            classify_line("# Acme overview"),
            Some(BriefLine::Paragraph("# Acme overview".into()))
        );
    }

    #[test]
    fn headings_strip_marker() {
        assert_eq!(
            classify_line("## Opportunity"),
            Some(BriefLine::Heading("Opportunity".into()))
        );
        assert_eq!(
            classify_line("  ## Proof Points  "),
            Some(BriefLine::Heading("Proof Points".into()))
        );
    }

    #[test]
    fn deeper_headings_are_paragraphs() {
        assert_eq!(
            classify_line("### Notes"),
            Some(BriefLine::Paragraph("### Notes".into()))
        );
    }

    #[test]
    fn all_bullet_markers_recognized() {
        for line in ["- one", "* one", "• one"] {
            assert_eq!(classify_line(line), Some(BriefLine::Bullet("one".into())));
        }
        assert_eq!(
            classify_line("-no space"),
            Some(BriefLine::Paragraph("-no space".into()))
        );
    }

    #[test]
    fn field_line_needs_pipe_and_bold_prefix() {
        let line = "**Company:** Acme | **Industry:** DevTools | **Priority:** High";
        assert_eq!(classify_line(line), Some(BriefLine::Field(line.into())));

        assert_eq!(
            classify_line("**Company:** Acme"),
            Some(BriefLine::Paragraph("**Company:** Acme".into()))
        );
        assert_eq!(
            classify_line("Company: Acme | Industry: DevTools"),
            Some(BriefLine::Paragraph("Company: Acme | Industry: DevTools".into()))
        );
    }

    #[test]
    fn parse_brief_produces_tagged_sequence() {
        let brief = "# ACME - PROSPECT BRIEF\n\
                     **Company:** Acme | **Priority:** High\n\
                     \n\
                     ## Opportunity\n\
                     Acme sells to developers.\n\
                     - Proof one\n";
        assert_eq!(
            parse_brief(brief),
            vec![
                BriefLine::Field("**Company:** Acme | **Priority:** High".into()),
                BriefLine::Blank,
                BriefLine::Heading("Opportunity".into()),
                BriefLine::Paragraph("Acme sells to developers.".into()),
                BriefLine::Bullet("Proof one".into()),
                BriefLine::Blank,
            ]
        );
    }

    #[test]
    fn strip_bold_keeps_inner_text() {
        assert_eq!(strip_bold("**Company:** Acme"), "Company: Acme");
        assert_eq!(strip_bold("a **b** c **d**"), "a b c d");
        assert_eq!(strip_bold("unmatched ** marker"), "unmatched ** marker");
    }

    #[test]
    fn sanitize_normalizes_punctuation() {
        assert_eq!(
            sanitize("\u{201C}Fast\u{201D} \u{2014} it\u{2019}s \u{2013} • done"),
            "\"Fast\" - it's - - done"
        );
    }

    #[test]
    fn sanitize_substitutes_unencodable() {
        assert_eq!(sanitize("café 🚀 日本"), "café ? ??");
    }
}
