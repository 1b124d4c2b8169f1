//! Nearest-vertex search over the trail
//!
//! A plain linear scan: the trail has a few thousand vertices and each query runs once per tap.
//! Comparisons are strictly-less-than, so when several vertices are equally near the one with
//! the lowest index wins, reproducibly.

use crate::{Result, Route, TrailError, utils};
use geo::Point;

/// A query point resolved onto a trail vertex
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapped {
    /// The trail vertex (an element of the route, never interpolated)
    pub vertex: Point<f64>,
    /// Index of the vertex in the route
    pub index: usize,
    /// Geodesic distance from the query point to the vertex, in meters
    pub distance: f64,
}

/// Running minimum for one query point
struct Nearest {
    query: Point<f64>,
    best: Option<Snapped>,
}

impl Nearest {
    fn new(query: Point<f64>) -> Self {
        Self { query, best: None }
    }

    #[inline]
    fn offer(&mut self, index: usize, vertex: Point<f64>) {
        let distance = utils::geodesic_distance(self.query, vertex);
        let closer = match &self.best {
            Some(best) => distance < best.distance,
            None => true,
        };
        if closer {
            self.best = Some(Snapped {
                vertex,
                index,
                distance,
            });
        }
    }
}

/// Find the route vertex nearest to `query`
///
/// Fails with [`TrailError::EmptyRoute`] when the route has no vertices and with
/// [`TrailError::InvalidCoordinate`] when `query` is not a finite WGS84 coordinate.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn nearest(query: Point<f64>, route: &Route) -> Result<Snapped> {
    let query = utils::validate_coordinate(query)?;

    let mut nearest = Nearest::new(query);
    for (index, vertex) in route.points().iter().enumerate() {
        nearest.offer(index, *vertex);
    }

    nearest.best.ok_or(TrailError::EmptyRoute)
}

/// Find the vertices nearest to `start` and to `end` in a single pass
///
/// Equivalent to two independent [`nearest`] queries; the two winners need not be related.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn nearest_pair(
    start: Point<f64>,
    end: Point<f64>,
    route: &Route,
) -> Result<(Snapped, Snapped)> {
    let start = utils::validate_coordinate(start)?;
    let end = utils::validate_coordinate(end)?;

    let mut nearest_start = Nearest::new(start);
    let mut nearest_end = Nearest::new(end);
    for (index, vertex) in route.points().iter().enumerate() {
        nearest_start.offer(index, *vertex);
        nearest_end.offer(index, *vertex);
    }

    match (nearest_start.best, nearest_end.best) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(TrailError::EmptyRoute),
    }
}
