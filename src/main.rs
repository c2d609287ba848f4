use std::process::ExitCode;

use stormview::{Viewer, ViewerConfig, ViewerError};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// `stormview [config.json]`
fn run() -> Result<(), ViewerError> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {}", path);
            ViewerConfig::load(&path)?
        }
        None => ViewerConfig::default(),
    };
    Viewer::with_config(config).run()
}
