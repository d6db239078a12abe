use std::path::PathBuf;
use std::process::ExitCode;

use court_session::logging::init_tracing;
use court_session::replay::{load_frames, render_report, replay, ReplayError};
use court_session::SessionConfig;

fn main() -> ExitCode {
    let config = SessionConfig::from_env();
    init_tracing(&config);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("court_replay: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &SessionConfig) -> Result<(), ReplayError> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .ok_or(ReplayError::Usage)?;

    let frames = load_frames(&path)?;
    let report = replay(frames, config);
    print!("{}", render_report(&report));
    Ok(())
}
