//! Layout reconstruction from positioned glyphs.
//!
//! Glyphs are merged into words using the horizontal and vertical
//! tolerances, words are clustered into lines, and lines are placed on a
//! character grid whose cell size is given by the densities. This mirrors
//! the layout mode of pdfplumber, so the same parameter values produce
//! comparable output.

use std::cmp::Ordering;

use super::options::ExtractionParameters;

/// Tolerance used by the parameter-free (raw) text pass.
pub const RAW_TOLERANCE: f32 = 3.0;

/// Upper bound for grid rows and columns. Tiny densities would otherwise
/// produce multi-megabyte runs of padding.
const MAX_GRID_CELLS: usize = 10_000;

/// A single glyph in top-left page coordinates (points).
#[derive(Debug, Clone, PartialEq)]
pub struct TextChar {
    /// Decoded text of the glyph (usually one char, ligatures may be more)
    pub text: String,
    /// Left edge
    pub x0: f32,
    /// Right edge
    pub x1: f32,
    /// Top edge, measured from the top of the page
    pub top: f32,
    /// Bottom edge, measured from the top of the page
    pub bottom: f32,
    /// Effective font size
    pub size: f32,
}

impl TextChar {
    /// Create a glyph from its left edge, top edge, width and font size.
    pub fn new(text: impl Into<String>, x0: f32, top: f32, width: f32, size: f32) -> Self {
        Self {
            text: text.into(),
            x0,
            x1: x0 + width,
            top,
            bottom: top + size,
            size,
        }
    }

    fn is_blank(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// All glyphs of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageChars {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Glyphs in content-stream order
    pub chars: Vec<TextChar>,
}

impl PageChars {
    /// Create an empty page.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            chars: Vec::new(),
        }
    }

    /// Raw text: words joined by single spaces, lines by newlines.
    pub fn raw_text(&self) -> String {
        simple_text(&self.chars, RAW_TOLERANCE, RAW_TOLERANCE)
    }

    /// Layout-aware text using the given parameters.
    pub fn layout_text(&self, params: &ExtractionParameters) -> String {
        layout_text(&self.chars, params)
    }
}

/// A word assembled from adjacent glyphs.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub x0: f32,
    pub x1: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Word {
    fn start(c: &TextChar) -> Self {
        Self {
            text: c.text.clone(),
            x0: c.x0,
            x1: c.x1,
            top: c.top,
            bottom: c.bottom,
        }
    }

    fn push(&mut self, c: &TextChar) {
        self.text.push_str(&c.text);
        self.x0 = self.x0.min(c.x0);
        self.x1 = self.x1.max(c.x1);
        self.top = self.top.min(c.top);
        self.bottom = self.bottom.max(c.bottom);
    }
}

/// A line of words sharing (roughly) the same top.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Words sorted left to right
    pub words: Vec<Word>,
    /// Smallest top of the line's words
    pub top: f32,
}

impl TextLine {
    fn from_words(mut words: Vec<Word>) -> Self {
        words.sort_by(|a, b| cmp_f32(a.x0, b.x0));
        let top = words.iter().map(|w| w.top).fold(f32::INFINITY, f32::min);
        Self { words, top }
    }

    /// Words joined by single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn cmp_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Group items into clusters whose consecutive `key` values differ by at
/// most `tolerance`. Clusters come out ordered by key; items keep their
/// relative order inside a cluster.
fn cluster_by<T>(mut items: Vec<T>, tolerance: f32, key: impl Fn(&T) -> f32) -> Vec<Vec<T>> {
    items.sort_by(|a, b| cmp_f32(key(a), key(b)));

    let mut clusters: Vec<Vec<T>> = Vec::new();
    let mut last_key = f32::NAN;
    for item in items {
        let k = key(&item);
        match clusters.last_mut() {
            Some(cluster) if (k - last_key).abs() <= tolerance => cluster.push(item),
            _ => clusters.push(vec![item]),
        }
        last_key = k;
    }
    clusters
}

/// Merge glyphs into words.
///
/// Glyphs are first bucketed into lines by their top edge, then scanned
/// left to right. Whitespace glyphs end the current word; so does a
/// horizontal gap larger than `x_tolerance` or a vertical jump larger than
/// `y_tolerance`.
pub fn extract_words(chars: &[TextChar], x_tolerance: f32, y_tolerance: f32) -> Vec<Word> {
    let mut words = Vec::new();

    let refs: Vec<&TextChar> = chars.iter().collect();
    for mut line in cluster_by(refs, y_tolerance, |c| c.top) {
        line.sort_by(|a, b| cmp_f32(a.x0, b.x0));

        let mut current: Option<Word> = None;
        let mut prev: Option<&TextChar> = None;
        for c in line {
            if c.is_blank() {
                words.extend(current.take());
                prev = None;
                continue;
            }

            let begins_new_word = prev.map_or(false, |p| {
                c.x0 > p.x1 + x_tolerance
                    || c.x1 < p.x0 - x_tolerance
                    || (c.top - p.top).abs() > y_tolerance
            });
            if begins_new_word {
                words.extend(current.take());
            }

            match current.as_mut() {
                Some(word) => word.push(c),
                None => current = Some(Word::start(c)),
            }
            prev = Some(c);
        }
        words.extend(current);
    }

    words
}

/// Cluster words into lines ordered top to bottom.
pub fn cluster_lines(words: Vec<Word>, y_tolerance: f32) -> Vec<TextLine> {
    cluster_by(words, y_tolerance, |w| w.top)
        .into_iter()
        .map(TextLine::from_words)
        .collect()
}

/// Parameter-free text: single spaces between words, newlines between lines.
pub fn simple_text(chars: &[TextChar], x_tolerance: f32, y_tolerance: f32) -> String {
    let words = extract_words(chars, x_tolerance, y_tolerance);
    cluster_lines(words, y_tolerance)
        .iter()
        .map(TextLine::text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Grid cell for a page position, or 0 when the density is degenerate.
fn grid_cell(position: f32, density: f32) -> usize {
    let cell = position / density;
    if !cell.is_finite() || cell <= 0.0 {
        return 0;
    }
    (cell.round() as usize).min(MAX_GRID_CELLS)
}

/// Layout-aware text.
///
/// Each line is placed on row `round(top / y_density)` and each word on
/// column `round(x0 / x_density)`, with at least one newline between lines
/// and one space between words. Trailing whitespace is trimmed from every
/// row and from the end of the text; leading blank rows are kept because
/// they carry the vertical position of the first line.
pub fn layout_text(chars: &[TextChar], params: &ExtractionParameters) -> String {
    let words = extract_words(chars, params.x_tolerance, params.y_tolerance);
    let lines = cluster_lines(words, params.y_tolerance);

    let mut out = String::new();
    let mut row = 0usize;
    for (i, line) in lines.iter().enumerate() {
        let target_row = grid_cell(line.top, params.y_density);
        let newlines = target_row.saturating_sub(row).max(usize::from(i > 0));
        for _ in 0..newlines {
            trim_trailing_spaces(&mut out);
            out.push('\n');
        }
        row += newlines;

        let mut col = 0usize;
        for word in &line.words {
            let target_col = grid_cell(word.x0, params.x_density);
            let spaces = target_col.saturating_sub(col).max(col.min(1));
            out.extend(std::iter::repeat(' ').take(spaces));
            out.push_str(&word.text);
            col += spaces + word.text.chars().count();
        }
    }

    out.truncate(out.trim_end().len());
    out
}

fn trim_trailing_spaces(out: &mut String) {
    let trimmed = out.trim_end_matches(' ').len();
    out.truncate(trimmed);
}
