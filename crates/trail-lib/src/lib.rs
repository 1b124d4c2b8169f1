//! Trail Library - Subsection Measurement Along a Fixed Walking Trail
//!
//! This library holds the route-matching core of a trail map: the trail is loaded once as an
//! ordered polyline, arbitrary taps are snapped onto its vertices, and the walked distance of
//! the trail between two snapped vertices is measured with an ellipsoidal geodesic.
//!
//! # Architecture
//!
//! - **[`Route`]** / **[`RouteConfig`]**: Immutable trail vertices and map framing, loaded by
//!   [`RouteStore`]
//! - **[`locator`]**: Linear nearest-vertex search (first vertex wins ties)
//! - **[`Subsection`]**: Contiguous run of vertices between two snapped taps, with distances
//! - **[`MeasurementSession`]**: Two-state machine interpreting successive taps
//! - **[`TrailEngine`]**: Caller-facing facade with one-shot loading and serialized taps
//!
//! # Performance Characteristics
//!
//! - **Load**: O(N) over the polyline source, once per process
//! - **Tap**: O(N) geodesic evaluations (one pass, even when snapping both ends)
//! - **Memory**: O(N) for the shared vertex slice; subsections copy only their own run

mod engine;
pub mod locator;
mod route;
mod session;
mod subsection;
pub mod utils;

// Public API exports
pub use engine::TrailEngine;
pub use locator::Snapped;
pub use route::{Route, RouteConfig, RouteStore};
pub use session::{MeasurementSession, SessionEvent, SessionState, transition};
pub use subsection::{Subsection, compute_subsection};

/// Failures while reading the trail polyline or its configuration
#[derive(Debug, thiserror::Error)]
pub enum SourceLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON parsing error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Route config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Polyline source is not a FeatureCollection")]
    NotFeatureCollection,

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Polyline source contains no line vertices")]
    NoVertices,
}

/// Error types for the engine
#[derive(Debug, thiserror::Error)]
pub enum TrailError {
    #[error("trail data unavailable: {0}")]
    SourceLoad(#[from] SourceLoadError),

    #[error("Empty route")]
    EmptyRoute,

    #[error("Invalid coordinate: ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Route already initialised")]
    AlreadyInitialised,
}

pub type Result<T> = std::result::Result<T, TrailError>;
