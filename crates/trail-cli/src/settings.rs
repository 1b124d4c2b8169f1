use clap::{Parser, Subcommand};
use geo::Point;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Trail - measure walked distances between two points along a fixed trail
pub struct Settings {
    /// Trail polyline (GeoJSON FeatureCollection of LineStrings)
    #[clap(short, long, value_name = "FILE", global = true)]
    pub route: Option<PathBuf>,

    /// Route configuration (JSON with name, centreLatitude, centreLongitude, initialZoom, loop)
    #[clap(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the loaded trail: name, vertices, length, centre
    Info,

    /// Feed taps through a measurement session and print each result as JSON
    Measure {
        /// A tapped point as LAT,LON (repeat; every second tap completes a measurement)
        #[clap(short, long = "tap", value_name = "LAT,LON", value_parser = parse_point, required = true)]
        taps: Vec<Point<f64>>,
    },

    /// Read taps (LAT,LON) and `clear` commands from stdin, one per line
    Session,

    /// Print the average of all line vertices of a polyline file
    Centre {
        /// Trail polyline (GeoJSON FeatureCollection)
        #[clap(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Parse `LAT,LON` into a point (`x` = longitude, `y` = latitude)
pub fn parse_point(value: &str) -> Result<Point<f64>, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {value:?}"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude {lat:?}: {e}"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude {lon:?}: {e}"))?;
    Ok(Point::new(lon, lat))
}
