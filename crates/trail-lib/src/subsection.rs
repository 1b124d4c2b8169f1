//! Subsection measurement between two snapped taps

use crate::{Result, Route, locator, utils};
use geo::Point;

/// A measured run of the trail, or a partial record while a measurement is in progress
///
/// - Empty: every field is `None`.
/// - Start only: just `start_point` is set, awaiting the end tap.
/// - Complete: `points` holds the contiguous run of vertices, ascending in route order and
///   including both ends, with its length.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Subsection {
    /// Vertex snapped from the start tap
    pub start_point: Option<Point<f64>>,
    /// Vertex snapped from the end tap
    pub end_point: Option<Point<f64>>,
    /// Vertices from the lower to the higher snapped index, inclusive
    pub points: Option<Vec<Point<f64>>>,
    /// Length in miles with exactly one decimal
    pub distance_miles: Option<String>,
    /// Length in kilometers with exactly one decimal
    pub distance_km: Option<String>,
    /// Unrounded length in meters
    pub distance_meters: Option<f64>,
}

impl Subsection {
    /// The record with nothing selected
    pub fn empty() -> Self {
        Self::default()
    }

    /// A record holding only a snapped start point
    pub fn start_only(start_point: Point<f64>) -> Self {
        Self {
            start_point: Some(start_point),
            ..Self::default()
        }
    }

    /// True when neither a start nor an end point is set
    pub fn is_empty(&self) -> bool {
        self.start_point.is_none() && self.end_point.is_none()
    }

    /// True when at least a start point is set
    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }

    /// True when the vertex run has been computed
    pub fn has_subsection(&self) -> bool {
        self.points.is_some()
    }

    /// Export as a GeoJSON feature for a map layer
    ///
    /// A complete subsection becomes a LineString, a start-only record a Point, and an empty
    /// record a feature without geometry. Distances are attached as properties.
    pub fn to_feature(&self) -> geojson::Feature {
        let position = |p: &Point<f64>| vec![p.x(), p.y()];

        let geometry = match (&self.points, &self.start_point) {
            (Some(points), _) => Some(geojson::Value::LineString(
                points.iter().map(position).collect(),
            )),
            (None, Some(start)) => Some(geojson::Value::Point(position(start))),
            (None, None) => None,
        };

        let mut properties = geojson::JsonObject::new();
        if let Some(miles) = &self.distance_miles {
            properties.insert("distanceMiles".to_string(), miles.clone().into());
        }
        if let Some(km) = &self.distance_km {
            properties.insert("distanceKm".to_string(), km.clone().into());
        }
        if let Some(meters) = self.distance_meters {
            properties.insert("distanceMeters".to_string(), meters.into());
        }

        geojson::Feature {
            bbox: None,
            geometry: geometry.map(geojson::Geometry::new),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Measure the trail between the vertices nearest to two tapped points
///
/// Both taps are snapped in one pass over the route. The extracted run always ascends in route
/// order whichever tap came first, so swapping the taps yields the same points and distance.
/// On a loop route the run never crosses the seam between the last and first vertex, even
/// when going the other way round would be shorter.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compute_subsection(
    tapped_start: Point<f64>,
    tapped_end: Point<f64>,
    route: &Route,
) -> Result<Subsection> {
    let (start, end) = locator::nearest_pair(tapped_start, tapped_end, route)?;

    let (low, high) = if start.index < end.index {
        (start.index, end.index)
    } else {
        (end.index, start.index)
    };
    let points = route.points()[low..=high].to_vec();

    let total_meters = utils::path_length(&points);
    let miles = utils::meters_to_miles(total_meters);
    let kilometers = utils::meters_to_kilometers(total_meters);

    tracing::debug!(
        "Subsection {}..={} ({} vertices): {:.1} m",
        low,
        high,
        points.len(),
        total_meters
    );

    Ok(Subsection {
        start_point: Some(start.vertex),
        end_point: Some(end.vertex),
        points: Some(points),
        distance_miles: Some(utils::format_one_decimal(miles)),
        distance_km: Some(utils::format_one_decimal(kilometers)),
        distance_meters: Some(total_meters),
    })
}
