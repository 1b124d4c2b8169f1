mod commands;
mod logging;
mod settings;

use clap::Parser;
use commands::CliError;
use settings::{Command, Settings};
use std::process::ExitCode;
use trail_lib::{TrailEngine, TrailError};

fn main() -> ExitCode {
    logging::setup_logging();
    let settings = Settings::parse();

    match run(settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(settings: Settings) -> commands::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &settings.command {
        Command::Centre { file } => {
            let polyline = std::fs::File::open(file)
                .map_err(|e| TrailError::from(trail_lib::SourceLoadError::from(e)))?;
            commands::centre(std::io::BufReader::new(polyline), &mut out)
        }
        Command::Info => commands::info(&load_engine(&settings)?, &mut out),
        Command::Measure { taps } => commands::measure(&load_engine(&settings)?, taps, &mut out),
        Command::Session => {
            let engine = load_engine(&settings)?;
            commands::session(&engine, std::io::stdin().lock(), &mut out)
        }
    }
}

/// Load the trail once, before any tap is accepted
fn load_engine(settings: &Settings) -> commands::Result<TrailEngine> {
    let route = settings.route.as_ref().ok_or(CliError::MissingRoute)?;

    let engine = TrailEngine::new();
    engine.initialize_route_files(route, settings.config.as_ref())?;
    Ok(engine)
}
