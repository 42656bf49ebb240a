//! Projection templates.
//!
//! A glyph is reduced to its column sums and row sums after resizing to a
//! canonical size. Two templates are compared axis by axis and the worse axis
//! decides the similarity.

use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::agent::config::RecognizerConfig;

/// Number of distinct symbols: ten digits plus the empty tile.
pub const SYMBOL_COUNT: usize = 11;

/// A symbol the recognizer can learn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A decimal digit, always in 0..=9
    Digit(u8),
    Empty,
}

impl Symbol {
    pub const ALL: [Symbol; SYMBOL_COUNT] = [
        Symbol::Digit(0),
        Symbol::Digit(1),
        Symbol::Digit(2),
        Symbol::Digit(3),
        Symbol::Digit(4),
        Symbol::Digit(5),
        Symbol::Digit(6),
        Symbol::Digit(7),
        Symbol::Digit(8),
        Symbol::Digit(9),
        Symbol::Empty,
    ];

    /// Slot of the symbol in a template table.
    pub fn index(self) -> usize {
        match self {
            Symbol::Digit(d) => d as usize,
            Symbol::Empty => 10,
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Digit(d) => write!(f, "{}", d),
            Symbol::Empty => write!(f, "EMPTY"),
        }
    }
}

/// Column and row intensity sums of a glyph at canonical size.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    /// One sum per column (length = template width)
    pub columns: Vec<f64>,
    /// One sum per row (length = template height)
    pub rows: Vec<f64>,
}

impl Template {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// Resizes a glyph image to the canonical size and projects it onto both axes.
pub fn reduce(glyph: &GrayImage, config: &RecognizerConfig) -> Template {
    let (w, h) = (config.template_width, config.template_height);
    let mut columns = vec![0.0; w as usize];
    let mut rows = vec![0.0; h as usize];

    if glyph.width() == 0 || glyph.height() == 0 {
        return Template { columns, rows };
    }

    let resized = imageops::resize(glyph, w, h, FilterType::Triangle);
    for (x, y, pixel) in resized.enumerate_pixels() {
        let v = pixel[0] as f64;
        columns[x as usize] += v;
        rows[y as usize] += v;
    }

    Template { columns, rows }
}

/// Similarity in [0, 1]; 1.0 means identical projections.
///
/// Each axis loss is the sum of `|a - b|^power` normalized by its largest
/// possible value, and the larger of the two losses is subtracted from 1.
pub fn similarity(a: &Template, b: &Template, power: i32) -> f64 {
    let (w, h) = (a.width() as f64, a.height() as f64);

    let column_loss = axis_loss(&a.columns, &b.columns, power);
    let row_loss = axis_loss(&a.rows, &b.rows, power);

    let max_column_loss = w * (h * 255.0).powi(power);
    let max_row_loss = h * (w * 255.0).powi(power);

    let loss = (column_loss / max_column_loss).max(row_loss / max_row_loss);
    (1.0 - loss).clamp(0.0, 1.0)
}

fn axis_loss(a: &[f64], b: &[f64], power: i32) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs().powi(power))
        .sum()
}
