//! Border following on binary images (Suzuki & Abe, 1985).
//!
//! Every nonzero pixel is foreground (8-connected), zero pixels are background
//! (4-connected). The raster scan discovers outer borders and hole borders in
//! order, and each border's parent is derived from the last border crossed on
//! the current row. The image frame acts as the root hole, so top-level outer
//! borders have no parent.

use image::GrayImage;

use super::BoundingRect;

/// Neighbor offsets in counter-clockwise order, starting east (y grows down).
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Which borders `find_contours` reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Retrieval {
    /// All borders with full parent/child links
    Tree,
    /// Only top-level outer borders, linked as siblings
    External,
}

/// A traced border with its place in the hierarchy.
///
/// Indices refer to positions in the vector returned by `find_contours`.
#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    /// Border pixels in traversal order
    pub points: Vec<(u32, u32)>,
    /// True for the inner border of a hole
    pub is_hole: bool,
    pub parent: Option<usize>,
    pub first_child: Option<usize>,
    pub next_sibling: Option<usize>,
}

impl Contour {
    pub fn bounding_rect(&self) -> BoundingRect {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        for &(x, y) in &self.points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        if self.points.is_empty() {
            return BoundingRect::default();
        }
        BoundingRect::new(
            min_x as i32,
            min_y as i32,
            (max_x - min_x + 1) as i32,
            (max_y - min_y + 1) as i32,
        )
    }

    /// Area enclosed by the border polygon (shoelace formula).
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: i64 = (0..n)
            .map(|i| {
                let (x0, y0) = self.points[i];
                let (x1, y1) = self.points[(i + 1) % n];
                x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64
            })
            .sum();
        twice.abs() as f64 / 2.0
    }
}

/// Traces every border of a binary image.
pub fn find_contours(binary: &GrayImage, mode: Retrieval) -> Vec<Contour> {
    let mut labels = Labels::new(binary);
    let mut contours: Vec<Contour> = Vec::new();
    // Border numbers start at 2; 1 is the frame
    let mut nbd: i32 = 1;

    for y in 1..labels.height - 1 {
        let mut lnbd: i32 = 1;
        for x in 1..labels.width - 1 {
            let value = labels.get(x, y);
            if value == 0 {
                continue;
            }

            let start = if value == 1 && labels.get(x - 1, y) == 0 {
                Some((false, x - 1))
            } else if value >= 1 && labels.get(x + 1, y) == 0 {
                Some((true, x + 1))
            } else {
                None
            };

            if let Some((is_hole, from_x)) = start {
                if is_hole && value > 1 {
                    lnbd = value;
                }
                nbd += 1;
                let parent = parent_of(&contours, is_hole, lnbd);
                let points = labels.trace((x, y), (from_x, y), nbd);
                contours.push(Contour {
                    points,
                    is_hole,
                    parent,
                    first_child: None,
                    next_sibling: None,
                });
            }

            let value = labels.get(x, y);
            if value != 1 {
                lnbd = value.abs();
            }
        }
    }

    match mode {
        Retrieval::Tree => {
            link_hierarchy(&mut contours);
            contours
        }
        Retrieval::External => {
            let mut outer: Vec<Contour> = contours
                .into_iter()
                .filter(|c| !c.is_hole && c.parent.is_none())
                .collect();
            link_hierarchy(&mut outer);
            outer
        }
    }
}

/// Counts the links in a contour's first-child sibling chain.
pub fn child_links(contours: &[Contour], index: usize) -> usize {
    let mut count = 0;
    let mut current = contours[index].first_child;
    while let Some(i) = current {
        count += 1;
        current = contours[i].next_sibling;
    }
    count
}

/// Parent of a new border given the last border crossed on this row.
///
/// Same kind as that border: share its parent. Opposite kind: it is the parent.
fn parent_of(contours: &[Contour], is_hole: bool, lnbd: i32) -> Option<usize> {
    if lnbd <= 1 {
        // The frame is a hole with no parent of its own
        return None;
    }
    let index = (lnbd - 2) as usize;
    let last = &contours[index];
    if last.is_hole == is_hole {
        last.parent
    } else {
        Some(index)
    }
}

fn link_hierarchy(contours: &mut [Contour]) {
    let mut last_child: Vec<Option<usize>> = vec![None; contours.len()];
    let mut last_top: Option<usize> = None;

    for i in 0..contours.len() {
        contours[i].first_child = None;
        contours[i].next_sibling = None;
        let parent = contours[i].parent.filter(|&p| p < contours.len());

        let previous = match parent {
            Some(p) => last_child[p].replace(i),
            None => last_top.replace(i),
        };
        match (previous, parent) {
            (Some(prev), _) => contours[prev].next_sibling = Some(i),
            (None, Some(p)) => contours[p].first_child = Some(i),
            (None, None) => {}
        }
    }
}

/// Zero-padded label image used during tracing.
struct Labels {
    data: Vec<i32>,
    width: usize,
    height: usize,
}

impl Labels {
    fn new(binary: &GrayImage) -> Self {
        let width = binary.width() as usize + 2;
        let height = binary.height() as usize + 2;
        let mut data = vec![0i32; width * height];
        for (x, y, pixel) in binary.enumerate_pixels() {
            if pixel[0] > 0 {
                data[(y as usize + 1) * width + x as usize + 1] = 1;
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    fn get(&self, x: usize, y: usize) -> i32 {
        self.data[y * self.width + x]
    }

    fn set(&mut self, x: usize, y: usize, value: i32) {
        self.data[y * self.width + x] = value;
    }

    fn neighbor(&self, (x, y): (usize, usize), dir: usize) -> (usize, usize) {
        let (dx, dy) = DIRECTIONS[dir];
        ((x as i32 + dx) as usize, (y as i32 + dy) as usize)
    }

    fn direction(from: (usize, usize), to: (usize, usize)) -> usize {
        let offset = (
            to.0 as i32 - from.0 as i32,
            to.1 as i32 - from.1 as i32,
        );
        DIRECTIONS.iter().position(|&d| d == offset).unwrap_or(0)
    }

    /// Follows one border from `start`, entering from the background pixel `from`.
    ///
    /// Returns the border pixels in unpadded image coordinates.
    fn trace(&mut self, start: (usize, usize), from: (usize, usize), nbd: i32) -> Vec<(u32, u32)> {
        let unpad = |(x, y): (usize, usize)| ((x - 1) as u32, (y - 1) as u32);

        // Clockwise search for the first nonzero neighbor
        let from_dir = Self::direction(start, from);
        let first = (0..8)
            .map(|k| (from_dir + 8 - k) % 8)
            .map(|d| self.neighbor(start, d))
            .find(|&(nx, ny)| self.get(nx, ny) != 0);

        let Some(first) = first else {
            // Isolated pixel
            self.set(start.0, start.1, -nbd);
            return vec![unpad(start)];
        };

        let mut points = Vec::new();
        let mut previous = first;
        let mut current = start;
        loop {
            points.push(unpad(current));

            // Counter-clockwise search starting just after the previous pixel
            let back = Self::direction(current, previous);
            let mut east_is_background = false;
            let mut next = previous;
            for k in 1..=8 {
                let dir = (back + k) % 8;
                let (nx, ny) = self.neighbor(current, dir);
                if self.get(nx, ny) != 0 {
                    next = (nx, ny);
                    break;
                }
                if dir == 0 {
                    east_is_background = true;
                }
            }

            if east_is_background {
                self.set(current.0, current.1, -nbd);
            } else if self.get(current.0, current.1) == 1 {
                self.set(current.0, current.1, nbd);
            }

            if next == start && current == first {
                break;
            }
            previous = current;
            current = next;
        }

        points
    }
}
