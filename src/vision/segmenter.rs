//! Tile segmentation.
//!
//! Splits a located field into its 16 tiles in row-major order and turns each
//! tile into a clean binary image: bright glyphs on a black background, or an
//! all-black image for a blank tile.

use image::{GrayImage, RgbaImage};

use super::contours::{find_contours, Retrieval};
use super::edges::canny;
use super::preprocess::{
    binarize, crop_margin, crop_rect, invert, mean, otsu_threshold, std_dev, to_gray, upscale,
};
use super::BoundingRect;
use crate::agent::config::SegmenterConfig;
use crate::error::SegmentError;

pub fn segment_tiles(
    field: &RgbaImage,
    config: &SegmenterConfig,
) -> Result<Vec<GrayImage>, SegmentError> {
    let gray = to_gray(&crop_margin(field, config.border_crop));
    let boxes = tile_boxes(&gray, config);

    if boxes.len() != config.tile_count {
        return Err(SegmentError::TileCount {
            found: boxes.len(),
            expected: config.tile_count,
        });
    }

    Ok(boxes
        .iter()
        .map(|b| prepare_tile(&crop_rect(&gray, &shrink(b, config)), config))
        .collect())
}

/// Bounding boxes of the tile outlines, sorted into row-major order.
fn tile_boxes(gray: &GrayImage, config: &SegmenterConfig) -> Vec<BoundingRect> {
    let edges = canny(gray, config.canny_low, config.canny_high);
    let mut boxes: Vec<BoundingRect> = find_contours(&edges, Retrieval::External)
        .iter()
        .map(|c| c.bounding_rect())
        .collect();

    // Tiles share one size; the largest box is the reference
    let reference = boxes.iter().map(|b| b.area()).max().unwrap_or(0) as f32;
    boxes.retain(|b| (b.area() as f32 - reference).abs() <= config.area_tolerance * reference);

    let bucket = config.bucket_tolerance.max(1) as i32;
    boxes.sort_by_key(|b| (b.y / bucket, b.x / bucket));
    boxes
}

/// Trims the cell border off a tile box and applies the recentering bias.
fn shrink(rect: &BoundingRect, config: &SegmenterConfig) -> BoundingRect {
    let keep = 1.0 - config.cell_crop;
    let width = (rect.width as f32 * keep) as i32;
    let height = (rect.height as f32 * keep) as i32;
    BoundingRect::new(
        rect.x + (rect.width - width) / 2 + config.x_bias,
        rect.y + (rect.height - height) / 2 + config.y_bias,
        width,
        height,
    )
}

fn prepare_tile(cell: &GrayImage, config: &SegmenterConfig) -> GrayImage {
    let binary = if std_dev(cell) < config.blank_std_dev {
        GrayImage::new(cell.width(), cell.height())
    } else {
        let thresholded = binarize(cell, otsu_threshold(cell.as_raw()));
        // Glyphs cover less area than the tile face
        if mean(&thresholded) > config.invert_threshold {
            invert(&thresholded)
        } else {
            thresholded
        }
    };
    upscale(&binary, config.scale_factor)
}
