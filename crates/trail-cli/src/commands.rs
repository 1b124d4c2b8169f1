//! Subcommand implementations
//!
//! Each command writes to a caller-supplied writer so it can run against stdout or a buffer.

use crate::settings::parse_point;
use geo::Point;
use std::io::{BufRead, Write};
use trail_lib::utils::{format_one_decimal, meters_to_kilometers, meters_to_miles};
use trail_lib::{Route, RouteStore, Subsection, TrailEngine, TrailError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Trail(#[from] TrailError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No route given; pass --route <FILE>")]
    MissingRoute,
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Summary of the loaded trail
pub fn info<W: Write>(engine: &TrailEngine, out: &mut W) -> Result<()> {
    let route = engine.current_route();
    let config = engine.current_route_config();

    let name = config.as_ref().map(|c| c.name.as_str()).unwrap_or("(unnamed)");
    writeln!(out, "Name:     {name}")?;
    writeln!(out, "Vertices: {}", route.len())?;
    writeln!(
        out,
        "Length:   {} km / {} mi",
        format_one_decimal(meters_to_kilometers(route.total_distance())),
        format_one_decimal(meters_to_miles(route.total_distance()))
    )?;
    if let Some(centre) = engine.initial_centre() {
        writeln!(out, "Centre:   {},{}", centre.y(), centre.x())?;
    }
    if let Some(config) = config {
        writeln!(out, "Zoom:     {}", config.initial_zoom)?;
        writeln!(out, "Loop:     {}", config.is_loop)?;
    }
    Ok(())
}

/// Run taps through the session in order, one JSON line per tap
pub fn measure<W: Write>(engine: &TrailEngine, taps: &[Point<f64>], out: &mut W) -> Result<()> {
    for tap in taps {
        let subsection = engine.handle_point(*tap)?;
        write_subsection(&subsection, out)?;
    }
    Ok(())
}

/// Interactive session: `LAT,LON` taps and `clear` commands, one per input line
///
/// Lines that cannot be parsed or tapped are reported and skipped.
pub fn session<R: BufRead, W: Write>(engine: &TrailEngine, input: R, out: &mut W) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let subsection = if line.eq_ignore_ascii_case("clear") {
            engine.clear_subsection()
        } else {
            let tap = match parse_point(line) {
                Ok(tap) => tap,
                Err(e) => {
                    tracing::warn!("Skipping line {:?}: {}", line, e);
                    continue;
                }
            };
            match engine.handle_point(tap) {
                Ok(subsection) => subsection,
                Err(e @ TrailError::InvalidCoordinate { .. }) => {
                    tracing::warn!("Skipping tap {:?}: {}", line, e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        };

        write_subsection(&subsection, out)?;
        out.flush()?;
    }
    Ok(())
}

/// Vertex average of a polyline file, for authoring a route config
pub fn centre<R: std::io::Read, W: Write>(polyline: R, out: &mut W) -> Result<()> {
    let route = Route::new(RouteStore::line_vertices(polyline)?);
    let Some(centre) = route.centre() else {
        return Err(TrailError::from(trail_lib::SourceLoadError::NoVertices).into());
    };

    writeln!(out, "Centre coordinate: {},{}", centre.y(), centre.x())?;
    writeln!(
        out,
        "https://www.google.com/maps/search/{},+{}",
        centre.y(),
        centre.x()
    )?;
    Ok(())
}

fn write_subsection<W: Write>(subsection: &Subsection, out: &mut W) -> Result<()> {
    serde_json::to_writer(&mut *out, &subsection.to_feature())?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTE_GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {},
                "geometry": {"type": "LineString", "coordinates": [[-2.0, 54.0], [-2.0, 54.01], [-2.0, 54.02]]}
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {"type": "LineString", "coordinates": [[-2.0, 54.03], [-2.0, 54.04]]}
            }
        ]
    }"#;

    const CONFIG_JSON: &str = r#"{
        "name": "CLI Way",
        "centreLatitude": 54.02,
        "centreLongitude": -2.0,
        "initialZoom": 10.5,
        "loop": false
    }"#;

    fn create_test_engine() -> TrailEngine {
        let engine = TrailEngine::new();
        engine
            .initialize_route(ROUTE_GEOJSON.as_bytes(), Some(CONFIG_JSON.as_bytes()))
            .unwrap();
        engine
    }

    fn output_lines(out: Vec<u8>) -> Vec<serde_json::Value> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_info() {
        let mut out = Vec::new();
        info(&create_test_engine(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Name:     CLI Way"));
        assert!(text.contains("Vertices: 5"));
        assert!(text.contains("Length:   4.5 km / 2.8 mi"));
        assert!(text.contains("Loop:     false"));
    }

    #[test]
    fn test_measure_prints_one_line_per_tap() {
        let taps = [
            Point::new(-2.001, 54.0101),
            Point::new(-1.999, 54.0299),
            Point::new(-2.0, 54.0),
        ];
        let mut out = Vec::new();
        measure(&create_test_engine(), &taps, &mut out).unwrap();

        let lines = output_lines(out);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["geometry"]["type"], "Point");
        assert_eq!(lines[1]["geometry"]["type"], "LineString");
        assert_eq!(lines[1]["geometry"]["coordinates"].as_array().unwrap().len(), 3);
        assert_eq!(lines[1]["properties"]["distanceKm"], "2.2");
        assert_eq!(lines[2]["geometry"]["type"], "Point");
    }

    #[test]
    fn test_session_handles_clear_and_bad_lines() {
        let input = "54.0,-2.0\nnot a point\n\n# comment\nclear\n54.04,-2.0\n91.0,-2.0\n54.0,-2.0\n";
        let mut out = Vec::new();
        session(&create_test_engine(), input.as_bytes(), &mut out).unwrap();

        let lines = output_lines(out);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["geometry"]["type"], "Point");
        assert!(lines[1]["geometry"].is_null());
        assert_eq!(lines[2]["geometry"]["type"], "Point");
        assert_eq!(lines[3]["geometry"]["coordinates"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_session_without_route_fails() {
        let mut out = Vec::new();
        let result = session(&TrailEngine::new(), "54.0,-2.0\n".as_bytes(), &mut out);
        assert!(matches!(result, Err(CliError::Trail(TrailError::EmptyRoute))));
    }

    #[test]
    fn test_centre() {
        let mut out = Vec::new();
        centre(ROUTE_GEOJSON.as_bytes(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let first = text.lines().next().unwrap();
        let coordinate = first.strip_prefix("Centre coordinate: ").unwrap();
        let (lat, lon) = coordinate.split_once(',').unwrap();
        assert!((lat.parse::<f64>().unwrap() - 54.02).abs() < 1e-9);
        assert!((lon.parse::<f64>().unwrap() - -2.0).abs() < 1e-9);
        assert!(text.contains("https://www.google.com/maps/search/"));
    }
}
