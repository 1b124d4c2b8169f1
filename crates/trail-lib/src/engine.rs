//! TrailEngine - Caller-facing facade over the loaded trail and the measurement session
//!
//! The route is loaded once and then shared read-only. Taps go through a mutex around the
//! single [`MeasurementSession`], so they are applied one at a time in the order the lock is
//! acquired, and the engine can be shared across threads behind an `Arc`.

use crate::{
    MeasurementSession, Result, Route, RouteConfig, RouteStore, SessionState, Subsection,
    TrailError,
};
use geo::Point;
use std::io::Read;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};

/// Trail data that never changes after initialisation
#[derive(Debug)]
struct LoadedTrail {
    route: Route,
    config: Option<RouteConfig>,
}

/// Top-level engine: one trail, one measurement session
#[derive(Debug, Default)]
pub struct TrailEngine {
    /// Set exactly once by a successful `initialize_route*` call
    trail: OnceLock<LoadedTrail>,
    /// Pending measurement state; taps are serialized through this lock
    session: Mutex<MeasurementSession>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl TrailEngine {
    /// Create an engine with no trail loaded
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the trail from byte streams
    ///
    /// One-shot: a second successful call is rejected with
    /// [`TrailError::AlreadyInitialised`]. A failed load leaves the engine uninitialised.
    pub fn initialize_route<P: Read, C: Read>(&self, polyline: P, config: Option<C>) -> Result<()> {
        #[cfg(feature = "profiling")]
        profiling::scope!("engine::initialize_route");

        if self.trail.get().is_some() {
            return Err(TrailError::AlreadyInitialised);
        }
        let (route, config) = RouteStore::load(polyline, config)?;
        self.install(route, config)
    }

    /// Load the trail from files
    pub fn initialize_route_files(
        &self,
        route_path: impl AsRef<Path>,
        config_path: Option<impl AsRef<Path>>,
    ) -> Result<()> {
        if self.trail.get().is_some() {
            return Err(TrailError::AlreadyInitialised);
        }
        let (route, config) = RouteStore::load_files(route_path, config_path)?;
        self.install(route, config)
    }

    fn install(&self, route: Route, config: Option<RouteConfig>) -> Result<()> {
        self.trail
            .set(LoadedTrail { route, config })
            .map_err(|_| TrailError::AlreadyInitialised)
    }

    /// Check if a trail has been loaded
    #[inline]
    pub fn is_initialised(&self) -> bool {
        self.trail.get().is_some()
    }

    /// The loaded route, or an empty route before initialisation
    pub fn current_route(&self) -> Route {
        self.trail
            .get()
            .map(|trail| trail.route.clone())
            .unwrap_or_default()
    }

    /// The loaded route configuration, if the source provided one
    pub fn current_route_config(&self) -> Option<RouteConfig> {
        self.trail.get().and_then(|trail| trail.config.clone())
    }

    /// Where the map should open: the configured centre, else the vertex average
    pub fn initial_centre(&self) -> Option<Point<f64>> {
        let trail = self.trail.get()?;
        trail
            .config
            .as_ref()
            .map(RouteConfig::centre)
            .or_else(|| trail.route.centre())
    }

    /// Advance the measurement session by one tap
    ///
    /// Before initialisation this fails with [`TrailError::EmptyRoute`].
    pub fn handle_point(&self, point: Point<f64>) -> Result<Subsection> {
        let route = self.current_route();
        let subsection = self.session().handle_point(point, &route)?;

        if subsection.has_subsection() {
            self.flag_seam_crossing(&route, &subsection);
        }
        Ok(subsection)
    }

    /// Reset the measurement session
    pub fn clear_subsection(&self) -> Subsection {
        self.session().clear()
    }

    /// Current session state
    pub fn session_state(&self) -> SessionState {
        self.session().state()
    }

    fn session(&self) -> MutexGuard<'_, MeasurementSession> {
        self.session.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Session mutex poisoned; recovering");
            poisoned.into_inner()
        })
    }

    /// Warn when a loop-route subsection is longer than the way round through the seam
    fn flag_seam_crossing(&self, route: &Route, subsection: &Subsection) {
        let is_loop = self
            .trail
            .get()
            .and_then(|trail| trail.config.as_ref())
            .is_some_and(|config| config.is_loop);
        let Some(meters) = subsection.distance_meters else {
            return;
        };

        if is_loop && meters > route.total_distance() / 2.0 {
            tracing::warn!(
                "Loop subsection of {:.0} m goes the long way round; the other way is {:.0} m",
                meters,
                route.total_distance() - meters
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const ROUTE_GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-2.0, 54.0], [-2.0, 54.01], [-2.0, 54.02], [-2.0, 54.03]]
                }
            }
        ]
    }"#;

    const CONFIG_JSON: &str = r#"{
        "name": "Engine Way",
        "centreLatitude": 54.015,
        "centreLongitude": -2.0,
        "initialZoom": 11.0,
        "loop": false
    }"#;

    fn create_test_engine() -> TrailEngine {
        let engine = TrailEngine::new();
        engine
            .initialize_route(ROUTE_GEOJSON.as_bytes(), Some(CONFIG_JSON.as_bytes()))
            .unwrap();
        engine
    }

    #[test]
    fn test_uninitialised_engine() {
        let engine = TrailEngine::new();
        assert!(!engine.is_initialised());
        assert!(engine.current_route().is_empty());
        assert!(engine.current_route_config().is_none());
        assert!(engine.initial_centre().is_none());
        assert!(matches!(
            engine.handle_point(Point::new(-2.0, 54.0)),
            Err(TrailError::EmptyRoute)
        ));
        assert_eq!(engine.session_state(), SessionState::AwaitingStart);
    }

    #[test]
    fn test_initialise_once() {
        let engine = create_test_engine();
        assert!(engine.is_initialised());
        assert_eq!(engine.current_route().len(), 4);
        assert_eq!(engine.current_route_config().unwrap().name, "Engine Way");

        let again = engine.initialize_route(ROUTE_GEOJSON.as_bytes(), None::<&[u8]>);
        assert!(matches!(again, Err(TrailError::AlreadyInitialised)));
        assert_eq!(engine.current_route_config().unwrap().name, "Engine Way");
    }

    #[test]
    fn test_failed_load_leaves_engine_uninitialised() {
        let engine = TrailEngine::new();
        let result = engine.initialize_route("[]".as_bytes(), None::<&[u8]>);
        assert!(matches!(result, Err(TrailError::SourceLoad(_))));
        assert!(!engine.is_initialised());

        engine
            .initialize_route(ROUTE_GEOJSON.as_bytes(), None::<&[u8]>)
            .unwrap();
        assert!(engine.is_initialised());
    }

    #[test]
    fn test_initial_centre() {
        let engine = create_test_engine();
        assert_eq!(engine.initial_centre(), Some(Point::new(-2.0, 54.015)));

        let without_config = TrailEngine::new();
        without_config
            .initialize_route(ROUTE_GEOJSON.as_bytes(), None::<&[u8]>)
            .unwrap();
        let centre = without_config.initial_centre().unwrap();
        assert!((centre.y() - 54.015).abs() < 1e-9);
    }

    #[test]
    fn test_tap_tap_clear() {
        let engine = create_test_engine();

        let start = engine.handle_point(Point::new(-2.001, 54.011)).unwrap();
        assert_eq!(start, Subsection::start_only(Point::new(-2.0, 54.01)));
        assert!(matches!(
            engine.session_state(),
            SessionState::AwaitingEnd { .. }
        ));

        let full = engine.handle_point(Point::new(-1.999, 54.029)).unwrap();
        assert_eq!(full.points.as_ref().map(Vec::len), Some(3));
        assert_eq!(engine.session_state(), SessionState::AwaitingStart);

        assert!(engine.clear_subsection().is_empty());
        assert_eq!(engine.session_state(), SessionState::AwaitingStart);
    }

    #[test]
    fn test_shared_engine_serializes_taps() {
        let engine = Arc::new(create_test_engine());
        let route = engine.current_route();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = engine.clone();
                let tap = route.get(i % route.len()).unwrap();
                std::thread::spawn(move || engine.handle_point(tap).unwrap())
            })
            .collect();

        let outputs: Vec<Subsection> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Eight taps alternate start/complete whatever order the threads ran in
        let completed = outputs.iter().filter(|s| s.has_subsection()).count();
        assert_eq!(completed, 4);
        assert_eq!(engine.session_state(), SessionState::AwaitingStart);
    }
}
