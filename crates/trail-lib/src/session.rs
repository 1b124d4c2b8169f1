//! Measurement session state machine
//!
//! A measurement is two taps: the first records a start vertex, the second completes the
//! subsection and returns the session to [`SessionState::AwaitingStart`], so the next tap
//! begins a fresh measurement. Clearing is allowed from either state.

use crate::{Result, Route, Subsection, locator, subsection};
use geo::Point;

/// Where the session is between taps
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SessionState {
    /// Next tap starts a measurement (also the state right after one completes)
    #[default]
    AwaitingStart,
    /// A start has been recorded and the next tap completes the measurement
    AwaitingEnd {
        /// The raw start tap, snapped again together with the end tap
        tapped_start: Point<f64>,
        /// The vertex the start tap snapped to
        snapped_start: Point<f64>,
    },
}

/// An input to the session
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionEvent {
    Tap(Point<f64>),
    Clear,
}

/// Advance the session by one event
///
/// Pure: returns the next state with the record to render. When the route is empty or the tap
/// is not a valid coordinate the error is returned and the caller keeps its current state.
pub fn transition(
    state: SessionState,
    event: SessionEvent,
    route: &Route,
) -> Result<(SessionState, Subsection)> {
    match (state, event) {
        (_, SessionEvent::Clear) => Ok((SessionState::AwaitingStart, Subsection::empty())),
        (SessionState::AwaitingStart, SessionEvent::Tap(point)) => {
            let snapped = locator::nearest(point, route)?;
            let next = SessionState::AwaitingEnd {
                tapped_start: point,
                snapped_start: snapped.vertex,
            };
            Ok((next, Subsection::start_only(snapped.vertex)))
        }
        (SessionState::AwaitingEnd { tapped_start, .. }, SessionEvent::Tap(point)) => {
            let subsection = subsection::compute_subsection(tapped_start, point, route)?;
            Ok((SessionState::AwaitingStart, subsection))
        }
    }
}

/// Owner of one session's state
///
/// Not shareable for concurrent mutation; callers serialize taps through `&mut self` (see
/// [`crate::TrailEngine`] for a thread-safe handle).
#[derive(Clone, Debug, Default)]
pub struct MeasurementSession {
    state: SessionState,
    /// End tap of the measurement that completed last, cleared by a new start
    tapped_end: Option<Point<f64>>,
}

impl MeasurementSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Raw end tap of the last completed measurement, if a new one has not started
    #[inline]
    pub fn tapped_end(&self) -> Option<Point<f64>> {
        self.tapped_end
    }

    /// Process one tap against `route`
    pub fn handle_point(&mut self, point: Point<f64>, route: &Route) -> Result<Subsection> {
        let (next, subsection) = transition(self.state, SessionEvent::Tap(point), route)?;

        self.tapped_end = match next {
            SessionState::AwaitingStart => Some(point),
            SessionState::AwaitingEnd { .. } => None,
        };
        tracing::debug!("Session {:?} -> {:?}", self.state, next);
        self.state = next;

        Ok(subsection)
    }

    /// Discard any pending or completed measurement
    pub fn clear(&mut self) -> Subsection {
        self.state = SessionState::AwaitingStart;
        self.tapped_end = None;
        tracing::debug!("Session cleared");
        Subsection::empty()
    }
}
