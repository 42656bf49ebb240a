//! Canny edge detection on 8-bit gray images.
//!
//! Gradients come from a 3x3 Sobel kernel with L1 magnitude (`|gx| + |gy|`),
//! thin out through non-maximum suppression along four quantized directions,
//! and are linked by hysteresis: weak pixels survive only when 8-connected to
//! a strong one. The result is a 0/255 image with one-pixel-wide edges.

use image::{GrayImage, Luma};

/// tan(22.5°) and tan(67.5°), the direction quantization boundaries.
const TAN_22_5: f32 = 0.414_213_56;
const TAN_67_5: f32 = 2.414_213_6;

const WEAK: u8 = 1;
const STRONG: u8 = 2;

pub fn canny(gray: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut output = GrayImage::new(width, height);
    let (w, h) = (width as usize, height as usize);
    if w < 3 || h < 3 {
        return output;
    }

    let (gx, gy, magnitude) = sobel(gray);
    let mut state = vec![0u8; w * h];

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            let m = magnitude[i];
            if m < low {
                continue;
            }

            let (ax, ay) = (gx[i].abs() as f32, gy[i].abs() as f32);
            let (a, b) = if ay <= ax * TAN_22_5 {
                (i - 1, i + 1)
            } else if ay >= ax * TAN_67_5 {
                (i - w, i + w)
            } else if (gx[i] > 0) == (gy[i] > 0) {
                (i - w - 1, i + w + 1)
            } else {
                (i - w + 1, i + w - 1)
            };

            // Strict on one side so plateaus two pixels wide keep exactly one pixel
            if m > magnitude[a] && m >= magnitude[b] {
                state[i] = if m >= high { STRONG } else { WEAK };
            }
        }
    }

    let mut stack: Vec<usize> = (0..w * h).filter(|&i| state[i] == STRONG).collect();
    while let Some(i) = stack.pop() {
        let (x, y) = (i % w, i / w);
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                let j = ny * w + nx;
                if state[j] == WEAK {
                    state[j] = STRONG;
                    stack.push(j);
                }
            }
        }
    }

    for (i, &s) in state.iter().enumerate() {
        if s == STRONG {
            output.put_pixel((i % w) as u32, (i / w) as u32, Luma([255]));
        }
    }

    output
}

/// Horizontal and vertical Sobel responses plus their L1 magnitude.
///
/// The one-pixel image border is left at zero.
fn sobel(gray: &GrayImage) -> (Vec<i32>, Vec<i32>, Vec<f32>) {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let raw = gray.as_raw();
    let px = |x: usize, y: usize| raw[y * w + x] as i32;

    let mut gx = vec![0i32; w * h];
    let mut gy = vec![0i32; w * h];
    let mut magnitude = vec![0f32; w * h];

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let dx = (px(x + 1, y - 1) + 2 * px(x + 1, y) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x - 1, y) + px(x - 1, y + 1));
            let dy = (px(x - 1, y + 1) + 2 * px(x, y + 1) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x, y - 1) + px(x + 1, y - 1));
            let i = y * w + x;
            gx[i] = dx;
            gy[i] = dy;
            magnitude[i] = (dx.abs() + dy.abs()) as f32;
        }
    }

    (gx, gy, magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    fn edge_pixels(edges: &GrayImage) -> Vec<(u32, u32)> {
        edges
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] == 255)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn test_flat_image_has_no_edges() {
        let gray = GrayImage::from_pixel(20, 20, Luma([120]));
        assert!(edge_pixels(&canny(&gray, 60.0, 180.0)).is_empty());
    }

    #[test]
    fn test_vertical_step_gives_single_pixel_line() {
        let gray: GrayImage =
            ImageBuffer::from_fn(20, 10, |x, _| Luma([if x < 10 { 250 } else { 100 }]));
        let edges = canny(&gray, 60.0, 180.0);

        for y in 1..9 {
            let row: Vec<u32> = (0..20).filter(|&x| edges.get_pixel(x, y)[0] == 255).collect();
            assert_eq!(row, vec![9], "row {y}");
        }
        // Border rows never carry edges
        assert!((0..20).all(|x| edges.get_pixel(x, 0)[0] == 0));
    }

    #[test]
    fn test_weak_edges_need_a_strong_neighbor() {
        // Left step is strong (contrast 150), right step is weak (contrast 20)
        let gray: GrayImage = ImageBuffer::from_fn(30, 10, |x, _| {
            Luma([match x {
                0..=9 => 250,
                10..=19 => 100,
                _ => 80,
            }])
        });
        let edges = canny(&gray, 60.0, 180.0);

        assert_eq!(edges.get_pixel(9, 5)[0], 255);
        assert_eq!(edges.get_pixel(19, 5)[0], 0);
    }

    #[test]
    fn test_tiny_images_are_blank() {
        let gray = GrayImage::from_pixel(2, 2, Luma([255]));
        assert_eq!(canny(&gray, 1.0, 2.0).dimensions(), (2, 2));
    }
}
