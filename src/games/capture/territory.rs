use super::geometry::{self, AreaMethod, Polygon};
use super::state::GridPos;
use super::union::PolygonUnion;

/// All claimed area, kept union-reduced after every successful merge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegionSet {
    polygons: Vec<Polygon>,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    /// Square of `side` cells around `center`, clipped to the grid.
    pub fn starting_square(center: GridPos, side: u32, width: u32, height: u32) -> Self {
        let half = (side / 2) as i32;
        let min = center.offset(-half, -half);
        let max = min.offset(side as i32, side as i32);

        let min = GridPos::new(min.x.max(0), min.y.max(0));
        let max = GridPos::new(max.x.min(width as i32), max.y.min(height as i32));

        Self {
            polygons: vec![Polygon::rectangle(min, max)],
        }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn contains(&self, point: &GridPos) -> bool {
        geometry::point_in_region_set(point, &self.polygons)
    }

    pub fn approximate_area(&self) -> u64 {
        geometry::approximate_area(&self.polygons)
    }

    pub fn area(&self, method: AreaMethod) -> f64 {
        method.measure(&self.polygons)
    }

    /// Union of this set and `new_polygon`.
    ///
    /// A failed union never reaches the caller: the polygon is appended
    /// unmerged instead, which keeps containment correct.
    pub fn merge_new_region(&self, new_polygon: Polygon, union: &dyn PolygonUnion) -> RegionSet {
        if self.polygons.is_empty() {
            return RegionSet::from_polygons(vec![new_polygon]);
        }

        let mut inputs = Vec::with_capacity(self.polygons.len() + 1);
        inputs.extend(self.polygons.iter().cloned());
        inputs.push(new_polygon);

        match union.union(&inputs) {
            Ok(merged) => {
                tracing::debug!(
                    "Merged {} polygons into {}",
                    inputs.len(),
                    merged.len()
                );
                RegionSet::from_polygons(merged)
            }
            Err(e) => {
                tracing::warn!("Union failed, keeping region unmerged: {}", e);
                RegionSet::from_polygons(inputs)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::capture::union::{GeometryError, LatticeUnion};

    struct FailingUnion;

    impl PolygonUnion for FailingUnion {
        fn union(&self, _polygons: &[Polygon]) -> Result<Vec<Polygon>, GeometryError> {
            Err(GeometryError::EmptyResult)
        }
    }

    fn rect(min: (i32, i32), max: (i32, i32)) -> Polygon {
        Polygon::rectangle(GridPos::new(min.0, min.1), GridPos::new(max.0, max.1))
    }

    #[test]
    fn test_starting_square() {
        let set = RegionSet::starting_square(GridPos::new(5, 5), 5, 10, 10);

        assert_eq!(set.polygons(), &[rect((3, 3), (8, 8))]);
        assert_eq!(set.approximate_area(), 25);
        assert!(set.contains(&GridPos::new(5, 5)));
        assert!(set.contains(&GridPos::new(3, 7)));
        assert!(!set.contains(&GridPos::new(8, 5)));
        assert!(!set.contains(&GridPos::new(2, 2)));
    }

    #[test]
    fn test_starting_square_clipped_at_edge() {
        let set = RegionSet::starting_square(GridPos::new(0, 9), 5, 10, 10);

        assert_eq!(set.polygons(), &[rect((0, 7), (3, 10))]);
        assert_eq!(set.approximate_area(), 9);
    }

    #[test]
    fn test_merge_into_empty_set() {
        let union = LatticeUnion::new(10, 10);
        let merged = RegionSet::new().merge_new_region(rect((1, 1), (3, 3)), &union);

        assert_eq!(merged.polygons(), &[rect((1, 1), (3, 3))]);
    }

    #[test]
    fn test_merge_adjacent_region() {
        let union = LatticeUnion::new(20, 20);
        let set = RegionSet::starting_square(GridPos::new(5, 5), 5, 20, 20);
        let merged = set.merge_new_region(rect((8, 3), (10, 8)), &union);

        assert_eq!(merged.polygons(), &[rect((3, 3), (10, 8))]);
        assert_eq!(merged.approximate_area(), 35);
    }

    #[test]
    fn test_merge_contained_region_keeps_area() {
        let union = LatticeUnion::new(20, 20);
        let set = RegionSet::starting_square(GridPos::new(5, 5), 5, 20, 20);
        let merged = set.merge_new_region(rect((4, 4), (6, 6)), &union);

        assert_eq!(merged.approximate_area(), set.approximate_area());
        assert_eq!(merged, set);
    }

    #[test]
    fn test_failed_union_appends_unmerged() {
        let set = RegionSet::starting_square(GridPos::new(5, 5), 5, 20, 20);
        let merged = set.merge_new_region(rect((10, 10), (12, 12)), &FailingUnion);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.polygons()[1], rect((10, 10), (12, 12)));
        assert!(merged.contains(&GridPos::new(5, 5)));
        assert!(merged.contains(&GridPos::new(11, 11)));
    }

    #[test]
    fn test_merge_never_shrinks() {
        let union = LatticeUnion::new(20, 20);
        let set = RegionSet::starting_square(GridPos::new(5, 5), 5, 20, 20);
        let merged = set.merge_new_region(rect((6, 6), (12, 9)), &union);

        for y in 0..20 {
            for x in 0..20 {
                let pos = GridPos::new(x, y);
                if set.contains(&pos) {
                    assert!(merged.contains(&pos), "lost ({}, {})", x, y);
                }
            }
        }
        assert!(merged.contains(&GridPos::new(11, 8)));
    }
}
