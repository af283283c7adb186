//! Polygon primitives over grid coordinates.
//!
//! Vertices sit on integer grid coordinates. Containment uses the usual
//! ray-casting parity rule evaluated in exact integer arithmetic, so a cell
//! `(x, y)` belongs to a polygon iff its coordinate lies in the half-open
//! interior. A square with corners `(3,3)` and `(8,8)` holds the 25 cells
//! `3..=7` on both axes.

use super::state::GridPos;

/// Axis-aligned bounds of a set of vertices, both corners inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min: GridPos,
    pub max: GridPos,
}

impl BoundingBox {
    pub fn width(&self) -> u64 {
        (self.max.x as i64 - self.min.x as i64) as u64
    }

    pub fn height(&self) -> u64 {
        (self.max.y as i64 - self.min.y as i64) as u64
    }

    pub fn area(&self) -> u64 {
        self.width() * self.height()
    }

    fn include(&mut self, pos: &GridPos) {
        self.min.x = self.min.x.min(pos.x);
        self.min.y = self.min.y.min(pos.y);
        self.max.x = self.max.x.max(pos.x);
        self.max.y = self.max.y.max(pos.y);
    }

    fn merge(&mut self, other: &BoundingBox) {
        self.include(&other.min);
        self.include(&other.max);
    }
}

/// One boundary of a polygon.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ring {
    points: Vec<GridPos>,
}

impl Ring {
    /// Wraps the points as given, closed or not.
    pub fn new(points: Vec<GridPos>) -> Self {
        Self { points }
    }

    /// Wraps the points, appending a copy of the first one if needed.
    pub fn closed(mut points: Vec<GridPos>) -> Self {
        if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
            if first != last {
                points.push(first);
            }
        }
        Self { points }
    }

    pub fn points(&self) -> &[GridPos] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }

    /// Rings with fewer than three points never contain anything.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3
    }

    pub fn contains(&self, point: &GridPos) -> bool {
        if self.is_degenerate() {
            return false;
        }

        let (px, py) = (point.x as i64, point.y as i64);
        let mut inside = false;
        let mut j = self.points.len() - 1;

        for i in 0..self.points.len() {
            let (xi, yi) = (self.points[i].x as i64, self.points[i].y as i64);
            let (xj, yj) = (self.points[j].x as i64, self.points[j].y as i64);

            if (yi > py) != (yj > py) {
                // px < xi + (xj - xi) * (py - yi) / (yj - yi), without the division
                let lhs = (px - xi) * (yj - yi);
                let rhs = (xj - xi) * (py - yi);
                let crosses = if yj > yi { lhs < rhs } else { lhs > rhs };
                if crosses {
                    inside = !inside;
                }
            }
            j = i;
        }

        inside
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = *self.points.first()?;
        let mut bounds = BoundingBox { min: first, max: first };
        for pos in &self.points[1..] {
            bounds.include(pos);
        }
        Some(bounds)
    }

    /// Twice the shoelace area. Positive when the ring runs clockwise on
    /// screen (y down), which is how traced outer boundaries are wound.
    pub fn signed_area2(&self) -> i64 {
        if self.points.len() < 2 {
            return 0;
        }
        let mut sum = 0i64;
        let mut j = self.points.len() - 1;
        for i in 0..self.points.len() {
            let (a, b) = (self.points[j], self.points[i]);
            sum += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
            j = i;
        }
        sum
    }
}

/// An outer ring followed by any hole rings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Polygon {
    rings: Vec<Ring>,
}

impl Polygon {
    pub fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    pub fn from_ring(ring: Ring) -> Self {
        Self { rings: vec![ring] }
    }

    /// Closed rectangle covering the cells `min..max` on both axes.
    pub fn rectangle(min: GridPos, max: GridPos) -> Self {
        Self::from_ring(Ring::closed(vec![
            min,
            GridPos::new(max.x, min.y),
            max,
            GridPos::new(min.x, max.y),
        ]))
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn outer(&self) -> Option<&Ring> {
        self.rings.first()
    }

    pub fn holes(&self) -> &[Ring] {
        self.rings.get(1..).unwrap_or(&[])
    }

    pub fn contains(&self, point: &GridPos) -> bool {
        point_in_polygon(point, self)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut boxes = self.rings.iter().filter_map(Ring::bounding_box);
        let mut bounds = boxes.next()?;
        for other in boxes {
            bounds.merge(&other);
        }
        Some(bounds)
    }
}

/// Parity test per ring, combined with exclusive-or so holes carve out.
pub fn point_in_polygon(point: &GridPos, polygon: &Polygon) -> bool {
    polygon
        .rings
        .iter()
        .fold(false, |inside, ring| inside ^ ring.contains(point))
}

pub fn point_in_region_set(point: &GridPos, polygons: &[Polygon]) -> bool {
    polygons.iter().any(|polygon| point_in_polygon(point, polygon))
}

/// Sum of the bounding-box areas of every ring, holes included.
pub fn approximate_area(polygons: &[Polygon]) -> u64 {
    polygons
        .iter()
        .flat_map(|polygon| polygon.rings.iter())
        .filter_map(Ring::bounding_box)
        .map(|bounds| bounds.area())
        .sum()
}

/// Shoelace area: the outer ring minus its holes.
pub fn exact_area(polygons: &[Polygon]) -> f64 {
    let twice: i64 = polygons
        .iter()
        .map(|polygon| {
            let mut rings = polygon.rings.iter().map(|ring| ring.signed_area2().abs());
            let outer = rings.next().unwrap_or(0);
            (outer - rings.sum::<i64>()).max(0)
        })
        .sum();
    twice as f64 / 2.0
}

/// How claimed area is measured for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AreaMethod {
    /// Bounding box per ring. Over-counts concave shapes and counts holes.
    #[default]
    BoundingBox,
    /// True polygon area with holes subtracted.
    Exact,
}

impl AreaMethod {
    pub fn measure(&self, polygons: &[Polygon]) -> f64 {
        match self {
            AreaMethod::BoundingBox => approximate_area(polygons) as f64,
            AreaMethod::Exact => exact_area(polygons),
        }
    }
}
