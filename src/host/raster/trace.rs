//! Selection outline tracing.
//!
//! Converts a selection mask into one closed outline per 4-connected selected
//! region. Outlines run along pixel edges, so vertices sit on pixel corners
//! (a pixel at `(x, y)` spans corners `(x, y)`..`(x + 1, y + 1)`). Interior
//! holes are filled before tracing: each region yields its outer outline only.

use std::collections::VecDeque;

use image::GrayImage;

/// Heading along the corner lattice (screen coordinates, y down).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dir {
    East,
    South,
    West,
    North,
}

impl Dir {
    fn delta(self) -> (i64, i64) {
        match self {
            Dir::East => (1, 0),
            Dir::South => (0, 1),
            Dir::West => (-1, 0),
            Dir::North => (0, -1),
        }
    }

    fn turn_right(self) -> Dir {
        match self {
            Dir::East => Dir::South,
            Dir::South => Dir::West,
            Dir::West => Dir::North,
            Dir::North => Dir::East,
        }
    }

    fn turn_left(self) -> Dir {
        match self {
            Dir::East => Dir::North,
            Dir::North => Dir::West,
            Dir::West => Dir::South,
            Dir::South => Dir::East,
        }
    }

    /// Cells on the (right, left) side of the edge leaving corner `(vx, vy)`.
    fn edge_cells(self, vx: i64, vy: i64) -> ((i64, i64), (i64, i64)) {
        match self {
            Dir::East => ((vx, vy), (vx, vy - 1)),
            Dir::South => ((vx - 1, vy), (vx, vy)),
            Dir::West => ((vx - 1, vy - 1), (vx - 1, vy)),
            Dir::North => ((vx, vy - 1), (vx - 1, vy - 1)),
        }
    }
}

/// One connected region found in the mask.
struct Region {
    pixels: Vec<(u32, u32)>,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

/// Trace every selected region of `mask`.
///
/// Regions are returned in row-major order of their first pixel. Vertices
/// closer than `tolerance` to the line through their neighbours are dropped.
pub fn trace_outlines(mask: &GrayImage, tolerance: f64) -> Vec<Vec<(f64, f64)>> {
    label_regions(mask)
        .iter()
        .map(|region| {
            let outline = trace_region(region);
            simplify_closed(outline, tolerance)
        })
        .filter(|outline| !outline.is_empty())
        .collect()
}

/// Flood-fill 4-connected regions in row-major scan order.
fn label_regions(mask: &GrayImage) -> Vec<Region> {
    let (width, height) = mask.dimensions();
    let mut visited = vec![false; width as usize * height as usize];
    let mut regions = Vec::new();
    let idx = |x: u32, y: u32| y as usize * width as usize + x as usize;

    for y in 0..height {
        for x in 0..width {
            if visited[idx(x, y)] || mask.get_pixel(x, y)[0] == 0 {
                continue;
            }

            let mut region = Region {
                pixels: Vec::new(),
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            };
            let mut queue = VecDeque::new();
            visited[idx(x, y)] = true;
            queue.push_back((x, y));

            while let Some((cx, cy)) = queue.pop_front() {
                region.pixels.push((cx, cy));
                region.min_x = region.min_x.min(cx);
                region.min_y = region.min_y.min(cy);
                region.max_x = region.max_x.max(cx);
                region.max_y = region.max_y.max(cy);

                let neighbours = [
                    (cx.wrapping_sub(1), cy),
                    (cx + 1, cy),
                    (cx, cy.wrapping_sub(1)),
                    (cx, cy + 1),
                ];
                for (nx, ny) in neighbours {
                    if nx >= width || ny >= height {
                        continue;
                    }
                    if !visited[idx(nx, ny)] && mask.get_pixel(nx, ny)[0] > 0 {
                        visited[idx(nx, ny)] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }

            regions.push(region);
        }
    }

    regions
}

/// Hole-filled occupancy grid of one region, padded by one empty cell.
struct Grid {
    width: i64,
    height: i64,
    filled: Vec<bool>,
}

impl Grid {
    fn from_region(region: &Region) -> Self {
        let width = (region.max_x - region.min_x) as i64 + 3;
        let height = (region.max_y - region.min_y) as i64 + 3;
        let mut inside = vec![false; (width * height) as usize];
        for &(x, y) in &region.pixels {
            let lx = (x - region.min_x) as i64 + 1;
            let ly = (y - region.min_y) as i64 + 1;
            inside[(ly * width + lx) as usize] = true;
        }

        // Everything the outside background cannot reach belongs to the region.
        let mut outside = vec![false; inside.len()];
        let mut queue = VecDeque::new();
        outside[0] = true;
        queue.push_back((0i64, 0i64));
        while let Some((x, y)) = queue.pop_front() {
            for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= width || ny >= height {
                    continue;
                }
                let i = (ny * width + nx) as usize;
                if !outside[i] && !inside[i] {
                    outside[i] = true;
                    queue.push_back((nx, ny));
                }
            }
        }

        Self {
            width,
            height,
            filled: outside.iter().map(|o| !o).collect(),
        }
    }

    fn is_filled(&self, (x, y): (i64, i64)) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height && self.filled[(y * self.width + x) as usize]
    }

    /// Whether the edge leaving `(vx, vy)` along `dir` has the region on its right.
    fn is_boundary(&self, vx: i64, vy: i64, dir: Dir) -> bool {
        let (right, left) = dir.edge_cells(vx, vy);
        self.is_filled(right) && !self.is_filled(left)
    }
}

/// Walk the outer boundary clockwise, keeping the region on the right.
///
/// Right turns are preferred so diagonal-only contacts are never crossed.
fn trace_region(region: &Region) -> Vec<(f64, f64)> {
    let grid = Grid::from_region(region);

    let start = match (0..grid.height)
        .flat_map(|y| (0..grid.width).map(move |x| (x, y)))
        .find(|&cell| grid.is_filled(cell))
    {
        Some(cell) => cell,
        None => return Vec::new(),
    };

    let offset_x = region.min_x as i64 - 1;
    let offset_y = region.min_y as i64 - 1;
    let to_global = |(x, y): (i64, i64)| ((x + offset_x) as f64, (y + offset_y) as f64);

    let mut points = vec![to_global(start)];
    let (mut vx, mut vy) = (start.0 + 1, start.1);
    let mut heading = Dir::East;
    let max_steps = 4 * (grid.width + 1) * (grid.height + 1);

    for _ in 0..max_steps {
        let next = [heading.turn_right(), heading, heading.turn_left()]
            .into_iter()
            .find(|&d| grid.is_boundary(vx, vy, d))
            .unwrap_or_else(|| heading.turn_right().turn_right());

        if (vx, vy) == start && next == Dir::East {
            break;
        }
        if next != heading {
            points.push(to_global((vx, vy)));
        }

        let (dx, dy) = next.delta();
        vx += dx;
        vy += dy;
        heading = next;
    }

    points
}

/// Drop vertices within `tolerance` of the chord joining their neighbours.
fn simplify_closed(points: Vec<(f64, f64)>, tolerance: f64) -> Vec<(f64, f64)> {
    if points.len() <= 3 || tolerance <= 0.0 {
        return points;
    }

    // The first vertex is the top-left extreme of the outline; it always stays.
    let n = points.len();
    let mut kept: Vec<(f64, f64)> = Vec::with_capacity(n);
    kept.push(points[0]);
    for i in 1..n {
        let prev = kept[kept.len() - 1];
        let next = points[(i + 1) % n];
        if distance_to_line(points[i], prev, next) > tolerance {
            kept.push(points[i]);
        }
    }

    if kept.len() < 3 {
        return points;
    }
    kept
}

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
fn distance_to_line(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-10 {
        return ((p.0 - a.0).powi(2) + (p.1 - a.1).powi(2)).sqrt();
    }
    ((p.0 - a.0) * dy - (p.1 - a.1) * dx).abs() / len
}
