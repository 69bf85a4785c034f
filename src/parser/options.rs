//! Extraction parameters and page selection.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tuning knobs for layout-aware text reconstruction.
///
/// Tolerances control how close glyphs must be to merge into the same word
/// (`x_tolerance`) or line (`y_tolerance`). Densities map page positions onto
/// a character grid: `x_density` points per column, `y_density` points per
/// row. Values are not validated; degenerate densities (zero, negative, NaN)
/// collapse the grid so words are separated by single spaces and lines by
/// single newlines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractionParameters {
    /// Maximum horizontal gap (points) between glyphs of one word
    pub x_tolerance: f32,

    /// Maximum vertical offset (points) between glyphs of one line
    pub y_tolerance: f32,

    /// Points per output column
    pub x_density: f32,

    /// Points per output row
    pub y_density: f32,
}

impl ExtractionParameters {
    /// Default horizontal tolerance.
    pub const DEFAULT_X_TOLERANCE: f32 = 2.0;
    /// Default vertical tolerance.
    pub const DEFAULT_Y_TOLERANCE: f32 = 4.0;
    /// Default horizontal density.
    pub const DEFAULT_X_DENSITY: f32 = 5.0;
    /// Default vertical density.
    pub const DEFAULT_Y_DENSITY: f32 = 10.0;

    /// Create parameters with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal tolerance.
    pub fn with_x_tolerance(mut self, value: f32) -> Self {
        self.x_tolerance = value;
        self
    }

    /// Set the vertical tolerance.
    pub fn with_y_tolerance(mut self, value: f32) -> Self {
        self.y_tolerance = value;
        self
    }

    /// Set the horizontal density.
    pub fn with_x_density(mut self, value: f32) -> Self {
        self.x_density = value;
        self
    }

    /// Set the vertical density.
    pub fn with_y_density(mut self, value: f32) -> Self {
        self.y_density = value;
        self
    }

    /// Set a parameter by its name (`x_tolerance`, `y_tolerance`,
    /// `x_density`, `y_density`). Returns `false` for unknown names.
    pub fn set(&mut self, name: &str, value: f32) -> bool {
        match name {
            "x_tolerance" => self.x_tolerance = value,
            "y_tolerance" => self.y_tolerance = value,
            "x_density" => self.x_density = value,
            "y_density" => self.y_density = value,
            _ => return false,
        }
        true
    }
}

impl Default for ExtractionParameters {
    fn default() -> Self {
        Self {
            x_tolerance: Self::DEFAULT_X_TOLERANCE,
            y_tolerance: Self::DEFAULT_Y_TOLERANCE,
            x_density: Self::DEFAULT_X_DENSITY,
            y_density: Self::DEFAULT_Y_DENSITY,
        }
    }
}

/// Options for a batch extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Layout parameters
    pub params: ExtractionParameters,

    /// Which pages to extract
    pub pages: PageSelection,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set layout parameters.
    pub fn with_params(mut self, params: ExtractionParameters) -> Self {
        self.params = params;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

/// Page selection (1-indexed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive)
    Range(RangeInclusive<u32>),
    /// Several ranges, sorted by start and merged where they touch
    Pages(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    /// Check if a page number is selected.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(ranges) => ranges.iter().any(|r| r.contains(&page)),
        }
    }

    /// Select individual pages.
    pub fn pages(pages: impl IntoIterator<Item = u32>) -> Self {
        PageSelection::Pages(merge_ranges(pages.into_iter().map(|p| p..=p).collect()))
    }

    /// Selected pages of a document with `page_count` pages, ascending.
    pub fn iter_pages(&self, page_count: u32) -> impl Iterator<Item = u32> + '_ {
        (1..=page_count).filter(move |p| self.includes(*p))
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let (start, end) = parse_bounds(s, start, end)?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut ranges = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let (start, end) = parse_bounds(part, start, end)?;
                ranges.push(start..=end);
            } else {
                let page = parse_page(part)?;
                ranges.push(page..=page);
            }
        }

        Ok(PageSelection::Pages(merge_ranges(ranges)))
    }
}

/// Sort ranges and merge overlapping or adjacent ones.
fn merge_ranges(mut ranges: Vec<RangeInclusive<u32>>) -> Vec<RangeInclusive<u32>> {
    ranges.sort_by_key(|r| *r.start());

    let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if *range.start() <= last.end().saturating_add(1) => {
                if range.end() > last.end() {
                    *last = *last.start()..=*range.end();
                }
            }
            _ => merged.push(range),
        }
    }
    merged
}

fn parse_page(s: &str) -> Result<u32> {
    match s.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(Error::InvalidPageRange(format!(
            "'{}' is not a page number",
            s.trim()
        ))),
        Ok(p) => Ok(p),
    }
}

fn parse_bounds(range: &str, start: &str, end: &str) -> Result<(u32, u32)> {
    let start = parse_page(start)?;
    let end = parse_page(end)?;
    if start > end {
        return Err(Error::InvalidPageRange(format!(
            "'{}' ends before it starts",
            range
        )));
    }
    Ok((start, end))
}
