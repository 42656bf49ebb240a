use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma, Pixel, RgbaImage};

use super::BoundingRect;

/// Converts an RGBA frame to 8-bit luminance.
///
/// Uses the BT.601 weights (0.299, 0.587, 0.114); alpha is ignored.
pub fn to_gray(img: &RgbaImage) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut output = ImageBuffer::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let luma = 0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32;
        output.put_pixel(x, y, Luma([luma.round().min(255.0) as u8]));
    }

    output
}

/// Crops an absolute rectangle, clamped to the image bounds.
///
/// A rectangle entirely outside the image yields an empty buffer.
pub fn crop_rect<P>(
    img: &ImageBuffer<P, Vec<P::Subpixel>>,
    rect: &BoundingRect,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    match rect.clamp_to(img.width(), img.height()) {
        Some(r) => {
            imageops::crop_imm(img, r.x as u32, r.y as u32, r.width as u32, r.height as u32)
                .to_image()
        }
        None => ImageBuffer::new(0, 0),
    }
}

/// Removes `fraction` of the width and height from every side.
pub fn crop_margin<P>(
    img: &ImageBuffer<P, Vec<P::Subpixel>>,
    fraction: f32,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    let (w, h) = (img.width() as i32, img.height() as i32);
    let dx = (w as f32 * fraction) as i32;
    let dy = (h as f32 * fraction) as i32;
    crop_rect(img, &BoundingRect::new(dx, dy, w - 2 * dx, h - 2 * dy))
}

pub fn mean(img: &GrayImage) -> f32 {
    let pixels = img.as_raw();
    if pixels.is_empty() {
        return 0.0;
    }
    pixels.iter().map(|&p| p as f64).sum::<f64>() as f32 / pixels.len() as f32
}

/// Population standard deviation of the gray levels.
pub fn std_dev(img: &GrayImage) -> f32 {
    let pixels = img.as_raw();
    if pixels.is_empty() {
        return 0.0;
    }
    let n = pixels.len() as f64;
    let mean = pixels.iter().map(|&p| p as f64).sum::<f64>() / n;
    let variance = pixels
        .iter()
        .map(|&p| {
            let d = p as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    variance.sqrt() as f32
}

/// Otsu's method: the threshold maximizing between-class variance.
///
/// Pixels `<= threshold` form the background class.
pub fn otsu_threshold(pixels: &[u8]) -> u8 {
    let mut histogram = [0u64; 256];
    for &p in pixels {
        histogram[p as usize] += 1;
    }

    let total = pixels.len() as f64;
    if total == 0.0 {
        return 0;
    }
    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut sum_bg = 0.0;
    let mut weight_bg = 0.0;
    let mut best_variance = 0.0;
    let mut threshold = 0u8;

    for (t, &count) in histogram.iter().enumerate() {
        weight_bg += count as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }

        sum_bg += t as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_all - sum_bg) / weight_fg;

        let between = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);
        if between > best_variance {
            best_variance = between;
            threshold = t as u8;
        }
    }

    threshold
}

/// Pixels strictly above `threshold` become 255, everything else 0.
pub fn binarize(img: &GrayImage, threshold: u8) -> GrayImage {
    let mut output = img.clone();
    for pixel in output.pixels_mut() {
        pixel[0] = if pixel[0] > threshold { 255 } else { 0 };
    }
    output
}

pub fn invert(img: &GrayImage) -> GrayImage {
    let mut output = img.clone();
    imageops::invert(&mut output);
    output
}

/// Scales by an integer factor with bilinear filtering.
pub fn upscale(img: &GrayImage, factor: u32) -> GrayImage {
    if factor <= 1 || img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    imageops::resize(
        img,
        img.width() * factor,
        img.height() * factor,
        FilterType::Triangle,
    )
}
