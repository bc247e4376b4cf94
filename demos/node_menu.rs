//! Terminal tag tree with a right-click node menu, using crossterm.
//!
//! Run: cargo run --bin node-menu
//!
//! Set `NODEMENU_LOG=<file>` to write debug logs there; the terminal is in
//! raw mode, so nothing is logged to stderr.

use std::fs::File;

use nodemenu_core::app::{App, AppConfig};
use nodemenu_crossterm::CrosstermDriver;
use nodemenu_demos::{TreeHost, HEIGHT, WIDTH};

fn init_logging() {
    let Some(path) = std::env::var_os("NODEMENU_LOG") else {
        return;
    };
    match File::create(&path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("cannot open log file {}: {e}", path.to_string_lossy()),
    }
}

fn main() {
    init_logging();
    let (width, height) = CrosstermDriver::size().unwrap_or((WIDTH, HEIGHT));
    log::info!("starting node-menu demo on a {width}x{height} screen");

    let mut app = App::new(AppConfig {
        model: TreeHost::new(width, height),
        driver: CrosstermDriver::new(),
        width,
        height,
    });

    if let Err(e) = app.run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
