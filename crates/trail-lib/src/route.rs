//! Route storage and loading module
//!
//! This module provides the immutable [`Route`] vertex sequence with precomputed metadata, the
//! [`RouteConfig`] framing record, and [`RouteStore`] which builds both from GeoJSON and JSON
//! byte streams.

use crate::{Result, SourceLoadError, utils};
use geo::Point;
use geojson::{GeoJson, Value};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// The trail as an ordered, immutable sequence of vertices
///
/// Cloning is cheap: the vertices are shared behind an `Arc`. `Route::default()` is the empty,
/// not yet loaded route.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Route {
    /// Trail vertices in trail order (`x` = longitude, `y` = latitude)
    points: Arc<[Point<f64>]>,
    /// Cached total geodesic length in meters (computed once during construction)
    cached_total_distance: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Route {
    /// Create a route from vertices in trail order
    pub fn new(points: Vec<Point<f64>>) -> Self {
        #[cfg(feature = "profiling")]
        profiling::scope!("route::new");

        let cached_total_distance = utils::path_length(&points);
        Self {
            points: points.into(),
            cached_total_distance,
        }
    }

    /// All vertices in trail order
    #[inline]
    pub fn points(&self) -> &[Point<f64>] {
        &self.points
    }

    /// Get a vertex by index
    #[inline]
    pub fn get(&self, index: usize) -> Option<Point<f64>> {
        self.points.get(index).copied()
    }

    /// Number of vertices
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the route has no vertices (not loaded)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total geodesic length of the trail in meters
    ///
    /// This is O(1) as the value is cached during construction.
    #[inline]
    pub fn total_distance(&self) -> f64 {
        self.cached_total_distance
    }

    /// Arithmetic mean of all vertex latitudes and longitudes
    ///
    /// Suitable for authoring the centre of a [`RouteConfig`]. Returns `None` for an empty
    /// route.
    pub fn centre(&self) -> Option<Point<f64>> {
        if self.points.is_empty() {
            return None;
        }

        let (sum_x, sum_y) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(x, y), p| (x + p.x(), y + p.y()));
        let n = self.points.len() as f64;
        Some(Point::new(sum_x / n, sum_y / n))
    }
}

/// Map framing and shape of the trail
///
/// Read from a flat JSON object whose five keys are all required.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    /// Display name of the trail
    pub name: String,
    /// Latitude of the initial map centre
    pub centre_latitude: f64,
    /// Longitude of the initial map centre
    pub centre_longitude: f64,
    /// Initial map zoom level
    pub initial_zoom: f64,
    /// Whether the trail is a closed loop
    #[serde(rename = "loop")]
    pub is_loop: bool,
}

impl RouteConfig {
    /// Initial map centre as a point
    #[inline]
    pub fn centre(&self) -> Point<f64> {
        Point::new(self.centre_longitude, self.centre_latitude)
    }
}

/// Builds the [`Route`] and [`RouteConfig`] from external sources
///
/// Loading is all-or-nothing: any failure means the trail is unavailable.
pub struct RouteStore;

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RouteStore {
    /// Load the trail polyline and, if given, its configuration
    pub fn load<P: Read, C: Read>(
        polyline: P,
        config: Option<C>,
    ) -> Result<(Route, Option<RouteConfig>)> {
        #[cfg(feature = "profiling")]
        profiling::scope!("route_store::load");

        let route = Self::load_route(polyline)?;
        let config = config.map(Self::load_config).transpose()?;

        tracing::info!(
            "Loaded route {:?}: {} vertices, {:.1} km",
            config.as_ref().map(|c| c.name.as_str()).unwrap_or("<unnamed>"),
            route.len(),
            utils::meters_to_kilometers(route.total_distance())
        );

        Ok((route, config))
    }

    /// Load the trail and configuration from files
    pub fn load_files(
        route_path: impl AsRef<Path>,
        config_path: Option<impl AsRef<Path>>,
    ) -> Result<(Route, Option<RouteConfig>)> {
        let polyline = std::fs::File::open(route_path.as_ref()).map_err(SourceLoadError::from)?;
        let config = config_path
            .map(|path| std::fs::File::open(path.as_ref()))
            .transpose()
            .map_err(SourceLoadError::from)?;

        Self::load(
            std::io::BufReader::new(polyline),
            config.map(std::io::BufReader::new),
        )
    }

    /// Parse a GeoJSON FeatureCollection into a route
    ///
    /// Vertices of every LineString feature are concatenated in the order the features and
    /// their positions appear. Features with other geometries are skipped.
    pub fn load_route<R: Read>(polyline: R) -> Result<Route> {
        let points = Self::line_vertices(polyline)?;
        if points.is_empty() {
            return Err(SourceLoadError::NoVertices.into());
        }
        Ok(Route::new(points))
    }

    /// Parse the flat JSON route configuration
    pub fn load_config<R: Read>(config: R) -> Result<RouteConfig> {
        let config: RouteConfig =
            serde_json::from_reader(config).map_err(SourceLoadError::from)?;
        Ok(config)
    }

    /// Collect the vertices of all LineString features, in source order
    pub fn line_vertices<R: Read>(polyline: R) -> Result<Vec<Point<f64>>> {
        let text = std::io::read_to_string(polyline).map_err(SourceLoadError::from)?;
        let geojson: GeoJson = text.parse().map_err(SourceLoadError::from)?;

        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(SourceLoadError::NotFeatureCollection.into());
        };

        let mut points = Vec::new();
        let mut line_features = 0usize;
        for (feature_index, feature) in collection.features.iter().enumerate() {
            match feature.geometry.as_ref().map(|g| &g.value) {
                Some(Value::LineString(positions)) => {
                    line_features += 1;
                    points.reserve(positions.len());
                    for position in positions {
                        points.push(Self::position_to_point(position, feature_index)?);
                    }
                }
                other => {
                    tracing::debug!(
                        "Skipping feature {} without LineString geometry ({})",
                        feature_index,
                        other.map(geometry_kind).unwrap_or("null")
                    );
                }
            }
        }

        tracing::debug!(
            "Read {} vertices from {} LineString features",
            points.len(),
            line_features
        );
        Ok(points)
    }

    /// Convert a GeoJSON `[longitude, latitude, ...]` position
    ///
    /// Both ordinates must be finite and within WGS84 range, so a swapped pair fails to load.
    fn position_to_point(position: &[f64], feature_index: usize) -> Result<Point<f64>> {
        let invalid = || {
            SourceLoadError::InvalidGeometry(format!(
                "feature {feature_index} has position {position:?}"
            ))
        };

        let [longitude, latitude, ..] = position else {
            return Err(invalid().into());
        };
        utils::validate_coordinate(Point::new(*longitude, *latitude))
            .map_err(|_| crate::TrailError::from(invalid()))
    }
}

/// GeoJSON type name of a geometry value
fn geometry_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}
