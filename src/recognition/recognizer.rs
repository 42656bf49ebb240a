//! Self-training tile recognizer.
//!
//! Starts with no knowledge of the font. `bootstrap` learns EMPTY, 2 and 4
//! from the opening board by topology alone (a 2 has no hole, a 4 has one),
//! and `add_template` learns further digits from tiles whose value is known
//! because the previous move was simulated. A learned template never changes.

use image::GrayImage;

use super::template::{reduce, similarity, Symbol, Template, SYMBOL_COUNT};
use crate::agent::config::RecognizerConfig;
use crate::error::BootstrapError;
use crate::vision::contours::{find_contours, Retrieval};
use crate::vision::preprocess::{binarize, crop_rect};
use crate::vision::BoundingRect;

/// Value read from one tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileMatch {
    /// Decimal value of the glyphs, 0 for an empty tile
    pub value: u32,
    /// Mean best similarity over the tile's glyphs, in [0, 1]
    pub confidence: f32,
}

/// Connected glyphs on a tile and the holes inside them.
struct Glyphs {
    shapes: Vec<BoundingRect>,
    holes: usize,
}

pub struct TileRecognizer {
    config: RecognizerConfig,
    templates: [Option<Template>; SYMBOL_COUNT],
    bootstrapped: bool,
}

impl TileRecognizer {
    pub fn new(config: RecognizerConfig) -> Self {
        Self {
            config,
            templates: std::array::from_fn(|_| None),
            bootstrapped: false,
        }
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    pub fn is_recognized(&self, symbol: Symbol) -> bool {
        self.templates[symbol.index()].is_some()
    }

    pub fn template(&self, symbol: Symbol) -> Option<&Template> {
        self.templates[symbol.index()].as_ref()
    }

    /// Learned templates in symbol order.
    pub fn gallery(&self) -> impl Iterator<Item = (Symbol, &Template)> + '_ {
        Symbol::ALL
            .iter()
            .filter_map(|&s| self.templates[s.index()].as_ref().map(|t| (s, t)))
    }

    /// Learns EMPTY, 2 and 4 from seed tiles taken in order.
    ///
    /// Stops as soon as all three are known. Does nothing once bootstrapped.
    pub fn bootstrap(&mut self, seeds: &[GrayImage]) -> Result<(), BootstrapError> {
        if self.bootstrapped {
            return Ok(());
        }

        let wanted = [Symbol::Empty, Symbol::Digit(2), Symbol::Digit(4)];
        let mut seen = [false; 3];

        for (index, tile) in seeds.iter().enumerate() {
            let glyphs = self.extract_glyphs(tile);
            if glyphs.shapes.len() > 1 || glyphs.holes > 1 {
                return Err(BootstrapError::AmbiguousSeed {
                    index,
                    shapes: glyphs.shapes.len(),
                    holes: glyphs.holes,
                });
            }

            let category = match (glyphs.shapes.len(), glyphs.holes) {
                (0, _) => 0,
                (_, 0) => 1,
                _ => 2,
            };
            if !seen[category] {
                seen[category] = true;
                match wanted[category] {
                    Symbol::Digit(d) => {
                        self.add_template(tile, d as u32);
                    }
                    Symbol::Empty => {
                        self.learn_empty(tile);
                    }
                }
            }

            if seen.iter().all(|&s| s) {
                self.bootstrapped = true;
                crate::log(&format!("Bootstrap complete after {} seed tiles", index + 1));
                return Ok(());
            }
        }

        Err(BootstrapError::SeedExhausted {
            missing: wanted
                .iter()
                .zip(seen)
                .filter(|(_, s)| !s)
                .map(|(w, _)| *w)
                .collect(),
        })
    }

    /// Reads the decimal value drawn on a tile.
    pub fn match_tile(&self, tile: &GrayImage) -> TileMatch {
        let mut shapes = self.extract_glyphs(tile).shapes;
        if shapes.is_empty() {
            return TileMatch {
                value: 0,
                confidence: 1.0,
            };
        }
        shapes.sort_by_key(|r| r.x);

        let mut value: u32 = 0;
        let mut total = 0.0;
        for rect in &shapes {
            let glyph = reduce(&crop_rect(tile, rect), &self.config);

            let mut best: Option<(Symbol, f64)> = None;
            for (symbol, template) in self.gallery() {
                let score = similarity(&glyph, template, self.config.loss_power);
                if best.is_none_or(|(_, s)| score > s) {
                    best = Some((symbol, score));
                }
            }

            match best {
                Some((Symbol::Digit(d), score)) => {
                    value = value.saturating_mul(10).saturating_add(d as u32);
                    total += score;
                }
                // Noise that looks like a blank tile carries no digit
                Some((Symbol::Empty, score)) => total += score,
                None => {}
            }
        }

        TileMatch {
            value,
            confidence: (total / shapes.len() as f64) as f32,
        }
    }

    /// Learns digit templates from a tile known to show `known`.
    ///
    /// Glyphs are paired with digits from the right, least significant first.
    /// Symbols that already have a template are left alone, and a tile whose
    /// glyph count differs from the digit count teaches nothing.
    /// Returns the number of templates learned.
    pub fn add_template(&mut self, tile: &GrayImage, known: u32) -> usize {
        let glyphs = self.extract_glyphs(tile);

        if known == 0 {
            return if glyphs.shapes.is_empty() && self.learn_empty(tile) {
                1
            } else {
                0
            };
        }

        let mut shapes = glyphs.shapes;
        shapes.sort_by_key(|r| std::cmp::Reverse(r.x));

        let mut digits = Vec::new();
        let mut rest = known;
        while rest > 0 {
            digits.push((rest % 10) as u8);
            rest /= 10;
        }

        if shapes.len() != digits.len() {
            crate::log(&format!(
                "Skipping label {}: {} glyphs for {} digits",
                known,
                shapes.len(),
                digits.len()
            ));
            return 0;
        }

        let mut learned = 0;
        for (rect, digit) in shapes.iter().zip(digits) {
            let slot = &mut self.templates[Symbol::Digit(digit).index()];
            if slot.is_some() {
                continue;
            }
            *slot = Some(reduce(&crop_rect(tile, rect), &self.config));
            crate::log(&format!("Learned template for digit {}", digit));
            learned += 1;
        }
        learned
    }

    fn learn_empty(&mut self, tile: &GrayImage) -> bool {
        let slot = &mut self.templates[Symbol::Empty.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(reduce(tile, &self.config));
        crate::log("Learned template for EMPTY");
        true
    }

    fn extract_glyphs(&self, tile: &GrayImage) -> Glyphs {
        let contours = find_contours(&binarize(tile, 127), Retrieval::Tree);
        let min_area = self.config.min_glyph_area as i64;

        let shapes = contours
            .iter()
            .filter(|c| !c.is_hole && c.parent.is_none())
            .map(|c| c.bounding_rect())
            .filter(|r| r.area() >= min_area)
            .collect();
        let holes = contours
            .iter()
            .filter(|c| c.is_hole && c.bounding_rect().area() >= min_area)
            .count();

        Glyphs { shapes, holes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{glyph_tile, glyph_tile_scaled};

    fn recognizer() -> TileRecognizer {
        TileRecognizer::new(RecognizerConfig::default())
    }

    fn bootstrapped() -> TileRecognizer {
        let mut r = recognizer();
        r.bootstrap(&[glyph_tile(2), glyph_tile(0), glyph_tile(4)]).unwrap();
        r
    }

    #[test]
    fn test_blank_tile_matches_without_templates() {
        let r = recognizer();
        assert_eq!(
            r.match_tile(&glyph_tile(0)),
            TileMatch {
                value: 0,
                confidence: 1.0
            }
        );
    }

    #[test]
    fn test_no_templates_means_no_confidence() {
        let m = recognizer().match_tile(&glyph_tile(2));
        assert_eq!(m.value, 0);
        assert_eq!(m.confidence, 0.0);
    }

    #[test]
    fn test_bootstrap_learns_empty_two_four() {
        let r = bootstrapped();
        assert!(r.is_bootstrapped());

        let learned: Vec<Symbol> = r.gallery().map(|(s, _)| s).collect();
        assert_eq!(learned, vec![Symbol::Digit(2), Symbol::Digit(4), Symbol::Empty]);
    }

    #[test]
    fn test_bootstrap_stops_once_complete() {
        // The trailing 8 would be ambiguous but is never inspected
        let mut r = recognizer();
        let seeds = [glyph_tile(0), glyph_tile(4), glyph_tile(2), glyph_tile(8)];
        assert!(r.bootstrap(&seeds).is_ok());
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let mut r = bootstrapped();
        let before: Vec<Template> = r.gallery().map(|(_, t)| t.clone()).collect();

        assert!(r.bootstrap(&[glyph_tile(8)]).is_ok());
        let after: Vec<Template> = r.gallery().map(|(_, t)| t.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_bootstrap_rejects_two_holes() {
        let mut r = recognizer();
        let err = r.bootstrap(&[glyph_tile(0), glyph_tile(8)]).unwrap_err();
        assert_eq!(
            err,
            BootstrapError::AmbiguousSeed {
                index: 1,
                shapes: 1,
                holes: 2
            }
        );
        assert!(!r.is_bootstrapped());
    }

    #[test]
    fn test_bootstrap_rejects_multi_digit_seed() {
        let mut r = recognizer();
        let err = r.bootstrap(&[glyph_tile(16)]).unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::AmbiguousSeed {
                index: 0,
                shapes: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_bootstrap_reports_missing_symbols() {
        let mut r = recognizer();
        let err = r
            .bootstrap(&[glyph_tile(2), glyph_tile(0), glyph_tile(2)])
            .unwrap_err();
        assert_eq!(
            err,
            BootstrapError::SeedExhausted {
                missing: vec![Symbol::Digit(4)]
            }
        );
    }

    #[test]
    fn test_matches_bootstrapped_digits() {
        let r = bootstrapped();

        let two = r.match_tile(&glyph_tile(2));
        assert_eq!(two.value, 2);
        assert!(two.confidence > 0.999);

        let four = r.match_tile(&glyph_tile(4));
        assert_eq!(four.value, 4);
        assert!(four.confidence > 0.999);
    }

    #[test]
    fn test_learns_multi_digit_label() {
        let mut r = bootstrapped();
        assert_eq!(r.add_template(&glyph_tile(16), 16), 2);
        assert!(r.is_recognized(Symbol::Digit(1)));
        assert!(r.is_recognized(Symbol::Digit(6)));

        assert_eq!(r.match_tile(&glyph_tile(16)).value, 16);
        assert_eq!(r.match_tile(&glyph_tile(64)).value, 64);
    }

    #[test]
    fn test_learned_five_stays_apart_from_two() {
        let mut r = bootstrapped();
        // 2 is already known, so only 5 and 6 are learned
        assert_eq!(r.add_template(&glyph_tile_scaled(256, 3), 256), 2);
        assert!(r.is_recognized(Symbol::Digit(5)));

        assert_eq!(r.match_tile(&glyph_tile(2)).value, 2);
        assert_eq!(r.match_tile(&glyph_tile(5)).value, 5);
        assert_eq!(r.match_tile(&glyph_tile(6)).value, 6);
        assert_eq!(r.match_tile(&glyph_tile_scaled(256, 3)).value, 256);
        assert_eq!(r.match_tile(&glyph_tile_scaled(526, 3)).value, 526);
    }

    #[test]
    fn test_templates_are_never_overwritten() {
        let mut r = bootstrapped();
        let before = r.template(Symbol::Digit(2)).cloned();

        assert_eq!(r.add_template(&glyph_tile_scaled(2, 3), 2), 0);
        assert_eq!(r.template(Symbol::Digit(2)).cloned(), before);
    }

    #[test]
    fn test_glyph_count_mismatch_teaches_nothing() {
        let mut r = bootstrapped();
        assert_eq!(r.add_template(&glyph_tile(16), 8), 0);
        assert!(!r.is_recognized(Symbol::Digit(8)));
        assert!(!r.is_recognized(Symbol::Digit(1)));
    }

    #[test]
    fn test_zero_label_learns_empty() {
        let mut r = recognizer();
        assert_eq!(r.add_template(&glyph_tile(2), 0), 0);
        assert_eq!(r.add_template(&glyph_tile(0), 0), 1);
        assert!(r.is_recognized(Symbol::Empty));
        assert_eq!(r.add_template(&glyph_tile(0), 0), 0);
    }
}
