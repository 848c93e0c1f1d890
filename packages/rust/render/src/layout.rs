//! Page layout for the formatted brief.
//!
//! Turns classified brief lines into positioned text runs on A4 pages. The
//! layout is backend-agnostic so pagination and wrapping can be tested
//! without producing a document.

use crate::lines::{BriefLine, parse_brief, sanitize};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 20.0;
/// Automatic page break threshold from the bottom edge.
pub const BOTTOM_MARGIN_MM: f32 = 15.0;
pub const BULLET_INDENT_MM: f32 = 25.0;

/// Fixed subtitle printed under the company name.
pub const SUBTITLE: &str = "TLDR Prospect Brief";

const PT_TO_MM: f32 = 0.3528;

// ---------------------------------------------------------------------------
// Font metrics
// ---------------------------------------------------------------------------

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em (Adobe AFM).
/// Helvetica-Oblique shares these.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Helvetica-Bold advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

/// Width assumed for Latin-1 characters outside the ASCII tables. Wide
/// enough for any accented capital in either face.
const FALLBACK_WIDTH: u16 = 778;

/// Advance width of `c` in 1/1000 em.
fn glyph_units(face: FontFace, c: char) -> u16 {
    let table = match face {
        FontFace::Bold => &HELVETICA_BOLD_WIDTHS,
        FontFace::Regular | FontFace::Italic => &HELVETICA_WIDTHS,
    };
    (c as usize)
        .checked_sub(32)
        .and_then(|idx| table.get(idx))
        .copied()
        .unwrap_or(FALLBACK_WIDTH)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size_pt: f32,
    pub rgb: (u8, u8, u8),
}

impl TextStyle {
    const fn new(face: FontFace, size_pt: f32, rgb: (u8, u8, u8)) -> Self {
        Self { face, size_pt, rgb }
    }

    fn char_width_mm(&self, c: char) -> f32 {
        f32::from(glyph_units(self.face, c)) / 1000.0 * self.size_pt * PT_TO_MM
    }

}

const BLACK: (u8, u8, u8) = (0, 0, 0);

const TITLE: TextStyle = TextStyle::new(FontFace::Bold, 18.0, BLACK);
const SUBTITLE_STYLE: TextStyle = TextStyle::new(FontFace::Italic, 11.0, (100, 100, 100));
const HEADING: TextStyle = TextStyle::new(FontFace::Bold, 11.0, (0, 102, 204));
const BODY: TextStyle = TextStyle::new(FontFace::Regular, 10.0, BLACK);
const FIELD: TextStyle = TextStyle::new(FontFace::Bold, 10.0, BLACK);

/// One line of text placed on a page. `y_mm` is the top of the line box,
/// measured from the top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x_mm: f32,
    pub y_mm: f32,
    pub height_mm: f32,
    pub text: String,
    pub style: TextStyle,
}

impl TextRun {
    /// Baseline measured from the bottom edge, as PDF coordinates expect.
    pub fn baseline_from_bottom_mm(&self) -> f32 {
        let baseline = self.y_mm + self.height_mm / 2.0 + 0.3 * self.style.size_pt * PT_TO_MM;
        PAGE_HEIGHT_MM - baseline
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub runs: Vec<TextRun>,
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

struct Cursor {
    pages: Vec<Page>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: MARGIN_MM,
        }
    }

    fn ln(&mut self, h: f32) {
        self.y += h;
    }

    /// Place a single unwrapped line, breaking the page first if it won't fit.
    fn cell(&mut self, x: f32, h: f32, text: String, style: TextStyle) {
        if self.y + h > PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM {
            self.pages.push(Page::default());
            self.y = MARGIN_MM;
        }
        if let Some(page) = self.pages.last_mut() {
            page.runs.push(TextRun {
                x_mm: x,
                y_mm: self.y,
                height_mm: h,
                text,
                style,
            });
        }
        self.y += h;
    }

    /// Place text wrapped to the right margin, one cell per line.
    fn multi_cell(&mut self, x: f32, h: f32, text: &str, style: TextStyle) {
        let width = PAGE_WIDTH_MM - MARGIN_MM - x;
        for line in wrap(text, width, |c| style.char_width_mm(c)) {
            self.cell(x, h, line, style);
        }
    }

    fn finish(self) -> Vec<Page> {
        self.pages
    }
}

/// Greedy word wrap to `max_width`, measured with `char_width`. Words
/// wider than a line are split.
pub fn wrap(text: &str, max_width: f32, char_width: impl Fn(char) -> f32) -> Vec<String> {
    let width_of = |s: &str| s.chars().map(&char_width).sum::<f32>();
    let space = char_width(' ');

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        let mut word_width = width_of(&word);

        while word_width > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            let (head, tail) = split_at_width(&word, max_width, &char_width);
            lines.push(head);
            word = tail;
            word_width = width_of(&word);
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word_width
        } else {
            current_width + space + word_width
        };
        if needed > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += space;
        }
        current.push_str(&word);
        current_width += word_width;
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Longest prefix of `word` that fits, never less than one character.
fn split_at_width(word: &str, max_width: f32, char_width: &impl Fn(char) -> f32) -> (String, String) {
    let mut width = 0.0;
    let mut split = word.len();
    for (idx, c) in word.char_indices() {
        let w = char_width(c);
        if width + w > max_width && idx > 0 {
            split = idx;
            break;
        }
        width += w;
    }
    (word[..split].to_string(), word[split..].to_string())
}

// ---------------------------------------------------------------------------
// Brief layout
// ---------------------------------------------------------------------------

/// Lay out the title block followed by the classified brief body.
pub fn layout_brief(company_name: &str, brief: &str) -> Vec<Page> {
    let mut cursor = Cursor::new();

    cursor.cell(MARGIN_MM, 10.0, sanitize(company_name), TITLE);
    cursor.cell(MARGIN_MM, 6.0, SUBTITLE.to_string(), SUBTITLE_STYLE);
    cursor.ln(4.0);

    for line in parse_brief(brief) {
        match line {
            BriefLine::Blank => cursor.ln(2.0),
            BriefLine::Heading(text) => {
                cursor.ln(3.0);
                cursor.cell(MARGIN_MM, 7.0, sanitize(&text), HEADING);
            }
            BriefLine::Bullet(text) => {
                let bullet = format!("- {}", sanitize(&text));
                cursor.multi_cell(BULLET_INDENT_MM, 5.0, &bullet, BODY);
            }
            BriefLine::Field(text) => cursor.multi_cell(MARGIN_MM, 6.0, &sanitize(&text), FIELD),
            BriefLine::Paragraph(text) => {
                cursor.multi_cell(MARGIN_MM, 5.0, &sanitize(&text), BODY)
            }
        }
    }

    cursor.finish()
}
