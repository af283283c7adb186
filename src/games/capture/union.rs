//! Polygon union behind a pluggable interface.
//!
//! [`LatticeUnion`] works on the grid itself: every input polygon is painted
//! onto a cell mask with the containment rule from [`super::geometry`], the
//! mask is split into 4-connected components, and each component's boundary
//! is traced back into a rectilinear polygon. Containment of the result
//! matches the union of the inputs cell for cell inside the grid.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::geometry::{Polygon, Ring};
use super::state::GridPos;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Polygon without any ring
    EmptyPolygon { polygon: usize },
    /// Ring whose first and last point differ
    UnclosedRing { polygon: usize, ring: usize },
    /// Closed ring with fewer than three distinct vertices
    DegenerateRing { polygon: usize, ring: usize },
    /// Inputs covered no grid cell
    EmptyResult,
    /// Boundary tracing could not close a ring
    OpenContour(GridPos),
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::EmptyPolygon { polygon } => {
                write!(f, "Polygon {} has no rings", polygon)
            }
            GeometryError::UnclosedRing { polygon, ring } => {
                write!(f, "Ring {} of polygon {} is not closed", ring, polygon)
            }
            GeometryError::DegenerateRing { polygon, ring } => {
                write!(f, "Ring {} of polygon {} is degenerate", ring, polygon)
            }
            GeometryError::EmptyResult => write!(f, "Union covers no cells"),
            GeometryError::OpenContour(pos) => {
                write!(f, "Boundary trace stalled at ({}, {})", pos.x, pos.y)
            }
        }
    }
}

impl std::error::Error for GeometryError {}

pub trait PolygonUnion: Send + Sync {
    /// Union of all `polygons` as a set of non-overlapping polygons.
    fn union(&self, polygons: &[Polygon]) -> Result<Vec<Polygon>, GeometryError>;
}

/// Union computed on the grid lattice.
#[derive(Debug, Clone, Copy)]
pub struct LatticeUnion {
    width: u32,
    height: u32,
}

impl LatticeUnion {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl PolygonUnion for LatticeUnion {
    fn union(&self, polygons: &[Polygon]) -> Result<Vec<Polygon>, GeometryError> {
        validate(polygons)?;

        let mut mask = CellMask::new(self.width, self.height);
        for polygon in polygons {
            mask.paint(polygon);
        }

        let (labels, count) = mask.label_components();
        if count == 0 {
            return Err(GeometryError::EmptyResult);
        }

        collect_boundaries(&mask, &labels, count)
            .into_iter()
            .map(trace_component)
            .collect()
    }
}

fn validate(polygons: &[Polygon]) -> Result<(), GeometryError> {
    for (polygon_idx, polygon) in polygons.iter().enumerate() {
        if polygon.rings().is_empty() {
            return Err(GeometryError::EmptyPolygon { polygon: polygon_idx });
        }
        for (ring_idx, ring) in polygon.rings().iter().enumerate() {
            if !ring.is_closed() {
                return Err(GeometryError::UnclosedRing {
                    polygon: polygon_idx,
                    ring: ring_idx,
                });
            }
            if ring.len() < 4 {
                return Err(GeometryError::DegenerateRing {
                    polygon: polygon_idx,
                    ring: ring_idx,
                });
            }
        }
    }
    Ok(())
}

/// Claimed/unclaimed flag per grid cell.
struct CellMask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl CellMask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
        }
    }

    fn in_bounds(&self, pos: &GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn pos_to_index(&self, pos: &GridPos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    fn is_set(&self, pos: &GridPos) -> bool {
        self.pos_to_index(pos).is_some_and(|idx| self.cells[idx])
    }

    fn paint(&mut self, polygon: &Polygon) {
        let Some(bounds) = polygon.bounding_box() else {
            return;
        };
        let max_x = self.width as i32 - 1;
        let max_y = self.height as i32 - 1;

        for y in bounds.min.y.max(0)..=bounds.max.y.min(max_y) {
            for x in bounds.min.x.max(0)..=bounds.max.x.min(max_x) {
                let pos = GridPos::new(x, y);
                if polygon.contains(&pos) {
                    if let Some(idx) = self.pos_to_index(&pos) {
                        self.cells[idx] = true;
                    }
                }
            }
        }
    }

    /// 4-connected labelling in row-major order.
    fn label_components(&self) -> (Vec<Option<usize>>, usize) {
        let mut labels = vec![None; self.cells.len()];
        let mut count = 0;

        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let seed = GridPos::new(x, y);
                let Some(seed_idx) = self.pos_to_index(&seed) else {
                    continue;
                };
                if !self.cells[seed_idx] || labels[seed_idx].is_some() {
                    continue;
                }

                labels[seed_idx] = Some(count);
                let mut queue = VecDeque::from([seed]);
                while let Some(pos) = queue.pop_front() {
                    for (dx, dy) in [(0, -1), (1, 0), (0, 1), (-1, 0)] {
                        let next = pos.offset(dx, dy);
                        if let Some(idx) = self.pos_to_index(&next) {
                            if self.cells[idx] && labels[idx].is_none() {
                                labels[idx] = Some(count);
                                queue.push_back(next);
                            }
                        }
                    }
                }
                count += 1;
            }
        }

        (labels, count)
    }
}

/// Unit boundary edges keyed by their start vertex.
type EdgeMap = BTreeMap<GridPos, Vec<GridPos>>;

/// Boundary edges per component, wound with the claimed cell on the right
/// (clockwise on screen).
fn collect_boundaries(mask: &CellMask, labels: &[Option<usize>], count: usize) -> Vec<EdgeMap> {
    let mut boundaries = vec![EdgeMap::new(); count];

    for y in 0..mask.height as i32 {
        for x in 0..mask.width as i32 {
            let pos = GridPos::new(x, y);
            let Some(label) = mask.pos_to_index(&pos).and_then(|idx| labels[idx]) else {
                continue;
            };
            let edges = &mut boundaries[label];
            let mut add = |from: GridPos, to: GridPos| edges.entry(from).or_default().push(to);

            if !mask.is_set(&pos.offset(0, -1)) {
                add(GridPos::new(x, y), GridPos::new(x + 1, y));
            }
            if !mask.is_set(&pos.offset(1, 0)) {
                add(GridPos::new(x + 1, y), GridPos::new(x + 1, y + 1));
            }
            if !mask.is_set(&pos.offset(0, 1)) {
                add(GridPos::new(x + 1, y + 1), GridPos::new(x, y + 1));
            }
            if !mask.is_set(&pos.offset(-1, 0)) {
                add(GridPos::new(x, y + 1), GridPos::new(x, y));
            }
        }
    }

    boundaries
}

/// Links one component's edges into rings: the outer boundary first, then holes.
fn trace_component(edges: EdgeMap) -> Result<Polygon, GeometryError> {
    let mut used: BTreeSet<(GridPos, GridPos)> = BTreeSet::new();
    let mut rings: Vec<Ring> = Vec::new();

    for (&start_from, targets) in &edges {
        for &start_to in targets {
            if used.contains(&(start_from, start_to)) {
                continue;
            }

            let mut points = vec![start_from];
            let (mut from, mut to) = (start_from, start_to);
            loop {
                used.insert((from, to));
                points.push(to);

                let next = next_vertex(&edges, from, to).ok_or(GeometryError::OpenContour(to))?;
                if (to, next) == (start_from, start_to) {
                    break;
                }
                if used.contains(&(to, next)) {
                    return Err(GeometryError::OpenContour(to));
                }
                from = to;
                to = next;
            }

            rings.push(Ring::closed(drop_collinear(points)));
        }
    }

    // Outer boundaries wind positive, holes negative
    rings.sort_by_key(|ring| std::cmp::Reverse(ring.signed_area2()));
    Ok(Polygon::new(rings))
}

/// At pinch vertices two edges leave; turning right keeps diagonal
/// neighbours apart.
fn next_vertex(edges: &EdgeMap, from: GridPos, at: GridPos) -> Option<GridPos> {
    let heading = at - from;
    let right = GridPos::new(-heading.y, heading.x);
    let left = GridPos::new(heading.y, -heading.x);
    let targets = edges.get(&at)?;

    [right, heading, left]
        .into_iter()
        .find_map(|turn| targets.iter().copied().find(|target| *target - at == turn))
}

/// Keeps only the corners of a closed unit-step ring.
fn drop_collinear(mut points: Vec<GridPos>) -> Vec<GridPos> {
    points.pop();
    let n = points.len();

    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            let a = cur - prev;
            let b = next - cur;
            a.x * b.y - a.y * b.x != 0
        })
        .map(|i| points[i])
        .collect()
}
