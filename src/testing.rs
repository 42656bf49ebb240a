//! Synthetic frames and tiles for unit tests.

use image::{GrayImage, Luma, Rgba, RgbaImage};

pub const FIELD_X: i32 = 40;
pub const FIELD_Y: i32 = 30;
pub const TILE_SIZE: i32 = 60;
pub const TILE_GAP: i32 = 8;
pub const FIELD_SIZE: i32 = 4 * TILE_SIZE + 5 * TILE_GAP;

const SCREEN_WIDTH: u32 = 400;
const SCREEN_HEIGHT: u32 = 360;

const BACKGROUND: u8 = 250;
const FIELD: u8 = 100;
const TILE_FACE: u8 = 200;
const INK: u8 = 30;

/// 5x7 block glyphs. "2" has no hole, "4" has one, "8" has two.
/// No two digits share both column and row projections.
const FONT: [[&str; 7]; 10] = [
    ["#####", "#...#", "#...#", "#...#", "#...#", "#...#", "#####"],
    ["..#..", ".##..", "..#..", "..#..", "..#..", "..#..", ".###."],
    ["#####", "....#", "....#", "#####", "#....", "#....", "#####"],
    ["#####", "....#", "....#", "#####", "....#", "....#", "#####"],
    ["...#.", "..##.", ".#.#.", "#####", "...#.", "...#.", "...#."],
    ["####.", "#....", "####.", "....#", "....#", "#...#", ".###."],
    ["#####", "#....", "#....", "#####", "#...#", "#...#", "#####"],
    ["#####", "....#", "....#", "...#.", "..#..", "..#..", "..#.."],
    ["#####", "#...#", "#...#", "#####", "#...#", "#...#", "#####"],
    ["#####", "#...#", "#...#", "#####", "....#", "....#", "#####"],
];

fn fill(img: &mut GrayImage, x: i32, y: i32, w: i32, h: i32, value: u8) {
    for yy in y.max(0)..(y + h).min(img.height() as i32) {
        for xx in x.max(0)..(x + w).min(img.width() as i32) {
            img.put_pixel(xx as u32, yy as u32, Luma([value]));
        }
    }
}

/// Draws `value` in decimal, centered in the given box.
fn draw_number(img: &mut GrayImage, value: u32, bounds: (i32, i32, i32, i32), scale: i32, ink: u8) {
    let (x0, y0, w, h) = bounds;
    let digits: Vec<usize> = value
        .to_string()
        .bytes()
        .map(|b| (b - b'0') as usize)
        .collect();
    let gap = scale;
    let total_width = digits.len() as i32 * 5 * scale + (digits.len() as i32 - 1) * gap;
    let ox = x0 + (w - total_width) / 2;
    let oy = y0 + (h - 7 * scale) / 2;

    for (k, &digit) in digits.iter().enumerate() {
        let gx = ox + k as i32 * (5 * scale + gap);
        for (row, line) in FONT[digit].iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch == '#' {
                    fill(img, gx + col as i32 * scale, oy + row as i32 * scale, scale, scale, ink);
                }
            }
        }
    }
}

/// A screen with the field drawn at (FIELD_X, FIELD_Y).
pub fn render_frame(values: &[u32; 16]) -> RgbaImage {
    let mut gray = GrayImage::from_pixel(SCREEN_WIDTH, SCREEN_HEIGHT, Luma([BACKGROUND]));
    fill(&mut gray, FIELD_X, FIELD_Y, FIELD_SIZE, FIELD_SIZE, FIELD);

    for (i, &value) in values.iter().enumerate() {
        let (row, col) = ((i / 4) as i32, (i % 4) as i32);
        let x = FIELD_X + TILE_GAP + col * (TILE_SIZE + TILE_GAP);
        let y = FIELD_Y + TILE_GAP + row * (TILE_SIZE + TILE_GAP);
        fill(&mut gray, x, y, TILE_SIZE, TILE_SIZE, TILE_FACE);
        if value != 0 {
            let scale = if value < 100 { 4 } else { 2 };
            draw_number(&mut gray, value, (x, y, TILE_SIZE, TILE_SIZE), scale, INK);
        }
    }

    RgbaImage::from_fn(SCREEN_WIDTH, SCREEN_HEIGHT, |x, y| {
        let v = gray.get_pixel(x, y)[0];
        Rgba([v, v, v, 255])
    })
}

/// A segmented tile: bright glyphs on black, or all black for 0.
pub fn glyph_tile(value: u32) -> GrayImage {
    let mut tile = GrayImage::new(72, 72);
    if value != 0 {
        draw_number(&mut tile, value, (0, 0, 72, 72), 5, 255);
    }
    tile
}

/// A segmented tile drawn at a custom glyph scale.
pub fn glyph_tile_scaled(value: u32, scale: i32) -> GrayImage {
    let mut tile = GrayImage::new(72, 72);
    draw_number(&mut tile, value, (0, 0, 72, 72), scale, 255);
    tile
}
