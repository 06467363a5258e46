use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;

mod audio;
mod config;
mod error;
mod library;
mod lyrics;
mod runtime;
mod session;
mod sync;
mod ui;

/// Log to a file: the terminal belongs to the TUI.
///
/// `LYRICO_LOG` sets the filter (default `warn`), `LYRICO_LOG_FILE` the
/// destination (default `lyrico.log` in the temp directory).
fn init_logging() {
    let path = env::var_os("LYRICO_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("lyrico.log"));

    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    env_logger::Builder::from_env(env_logger::Env::new().filter_or("LYRICO_LOG", "warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    runtime::run()
}
