//! Playing-field localization.
//!
//! The field is the first square-ish contour (in discovery order) that
//! encloses something and whose first-child sibling chain is short. On an
//! edge map the field outline yields a ring whose only child is its own hole,
//! while cluttered regions such as text blocks produce long sibling chains.

use image::{GrayImage, RgbaImage};

use super::contours::{child_links, find_contours, Retrieval};
use super::edges::canny;
use super::preprocess::{crop_rect, to_gray};
use super::BoundingRect;
use crate::agent::config::LocatorConfig;
use crate::error::LocateError;

/// A field found in a frame.
#[derive(Clone, Debug)]
pub struct LocatedField {
    /// The frame cropped to the unpadded field rectangle
    pub image: RgbaImage,
    /// Field rectangle in frame coordinates, padded by `LocatorConfig::padding`
    pub rect: BoundingRect,
}

pub fn locate_field(frame: &RgbaImage, config: &LocatorConfig) -> Result<LocatedField, LocateError> {
    let gray = to_gray(frame);
    let edges = canny(&gray, config.canny_low, config.canny_high);
    let rect = find_grid(&edges, config).ok_or(LocateError::GridNotFound)?;

    Ok(LocatedField {
        image: crop_rect(frame, &rect),
        rect: rect.padded(config.padding),
    })
}

/// Picks the field contour on a binary edge map and returns its bounding box.
pub fn find_grid(edges: &GrayImage, config: &LocatorConfig) -> Option<BoundingRect> {
    let contours = find_contours(edges, Retrieval::Tree);

    contours
        .iter()
        .enumerate()
        .filter(|(_, c)| c.first_child.is_some())
        .filter(|(_, c)| {
            let aspect = c.bounding_rect().aspect_ratio();
            aspect > 1.0 - config.aspect_epsilon && aspect < 1.0 + config.aspect_epsilon
        })
        .filter(|(_, c)| c.area() > config.min_area as f64)
        .find(|(i, _)| child_links(&contours, *i) <= config.max_child_links)
        .map(|(_, c)| c.bounding_rect())
}
