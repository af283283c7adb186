use super::geometry::{Polygon, Ring};
use super::state::GridPos;

/// What one movement step did to the trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrailStep {
    /// Moved within territory
    Inside,
    /// Just left territory; the trail now holds the cell left from
    Departed,
    /// Still outside
    Extended,
    /// Re-entered territory. Carries the enclosed region when one could be formed.
    Closed(Option<Polygon>),
}

/// Path taken since the agent last left its territory.
///
/// The first point is the claimed cell the agent left from; the rest are
/// unclaimed cells. Empty while the agent is inside.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trail {
    points: Vec<GridPos>,
}

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<GridPos>) -> Self {
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

    pub fn clear(&mut self) {
        self.points.clear();
    }

    fn push(&mut self, pos: GridPos) {
        if self.points.last() != Some(&pos) {
            self.points.push(pos);
        }
    }

    /// Whether stepping onto `pos` hits the trail, departure cell included.
    pub fn collides(&self, pos: &GridPos) -> bool {
        self.points.contains(pos)
    }

    /// Advances the trail for a move from `previous` to `next`.
    pub fn record_step(
        &mut self,
        previous: GridPos,
        next: GridPos,
        was_outside: bool,
        now_in_territory: bool,
    ) -> TrailStep {
        match (was_outside, now_in_territory) {
            (false, true) => TrailStep::Inside,
            (false, false) => {
                self.points = vec![previous];
                TrailStep::Departed
            }
            (true, false) => {
                self.push(previous);
                TrailStep::Extended
            }
            (true, true) => {
                self.push(previous);
                self.push(next);
                let polygon = build_polygon(&self.points, next);
                self.clear();
                TrailStep::Closed(polygon)
            }
        }
    }
}

/// Closes `trail` through `current` into a polygon. The raw trail is used
/// as the whole boundary; nothing is trimmed against the territory edge.
pub fn build_polygon(trail: &[GridPos], current: GridPos) -> Option<Polygon> {
    if trail.len() < 2 {
        return None;
    }

    let mut points = trail.to_vec();
    if points.last() != Some(&current) {
        points.push(current);
    }

    Some(Polygon::from_ring(Ring::closed(points)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: i32, y: i32) -> GridPos {
        GridPos::new(x, y)
    }

    #[test]
    fn test_inside_move_is_noop() {
        let mut trail = Trail::new();
        assert_eq!(trail.record_step(pos(5, 5), pos(6, 5), false, true), TrailStep::Inside);
        assert!(trail.is_empty());
    }

    #[test]
    fn test_leaving_resets_to_departure_cell() {
        let mut trail = Trail::from_points(vec![pos(0, 0), pos(1, 0)]);
        assert_eq!(trail.record_step(pos(7, 5), pos(8, 5), false, false), TrailStep::Departed);
        assert_eq!(trail.points(), &[pos(7, 5)]);
    }

    #[test]
    fn test_outside_steps_are_deduplicated() {
        let mut trail = Trail::new();
        trail.record_step(pos(7, 5), pos(8, 5), false, false);
        trail.record_step(pos(8, 5), pos(9, 5), true, false);
        trail.record_step(pos(8, 5), pos(9, 5), true, false);
        trail.record_step(pos(9, 5), pos(9, 6), true, false);

        assert_eq!(trail.points(), &[pos(7, 5), pos(8, 5), pos(9, 5)]);
    }

    #[test]
    fn test_return_closes_polygon() {
        let mut trail = Trail::new();
        trail.record_step(pos(7, 5), pos(8, 5), false, false);
        trail.record_step(pos(8, 5), pos(8, 6), true, false);

        let polygon = match trail.record_step(pos(8, 6), pos(7, 6), true, true) {
            TrailStep::Closed(Some(polygon)) => polygon,
            other => panic!("expected a closed polygon, got {:?}", other),
        };

        assert!(trail.is_empty());
        assert_eq!(
            polygon.outer().unwrap().points(),
            &[pos(7, 5), pos(8, 5), pos(8, 6), pos(7, 6), pos(7, 5)]
        );
    }

    #[test]
    fn test_build_polygon_needs_two_points() {
        assert!(build_polygon(&[], pos(1, 1)).is_none());
        assert!(build_polygon(&[pos(0, 0)], pos(1, 1)).is_none());
    }

    #[test]
    fn test_build_polygon_is_always_closed() {
        let polygon = build_polygon(&[pos(0, 0), pos(3, 0), pos(3, 3)], pos(0, 3)).unwrap();
        let ring = polygon.outer().unwrap();
        assert!(ring.is_closed());
        assert_eq!(ring.len(), 5);

        // Already ending on the first point: no extra copy
        let polygon = build_polygon(&[pos(0, 0), pos(3, 0), pos(3, 3)], pos(0, 0)).unwrap();
        assert_eq!(polygon.outer().unwrap().len(), 4);
        assert!(polygon.outer().unwrap().is_closed());
    }

    #[test]
    fn test_collides_includes_departure_cell() {
        let trail = Trail::from_points(vec![pos(7, 5), pos(8, 5), pos(9, 5)]);
        assert!(trail.collides(&pos(7, 5)));
        assert!(trail.collides(&pos(8, 5)));
        assert!(trail.collides(&pos(9, 5)));
        assert!(!trail.collides(&pos(9, 6)));
        assert!(!Trail::new().collides(&pos(0, 0)));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_built_ring_is_closed(
                points in prop::collection::vec((0i32..20, 0i32..20), 2..30),
                current in (0i32..20, 0i32..20),
            ) {
                let trail: Vec<GridPos> = points.into_iter().map(|(x, y)| pos(x, y)).collect();
                let polygon = build_polygon(&trail, pos(current.0, current.1)).unwrap();
                let ring = polygon.outer().unwrap();

                prop_assert!(ring.is_closed());
                prop_assert_eq!(ring.points().first(), ring.points().last());
            }
        }
    }
}
