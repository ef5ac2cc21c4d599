//! Draws the triangle with `glDrawElements` through an element buffer.

use std::process::ExitCode;

use gl_triangle::app;
use gl_triangle::config::AppConfig;
use gl_triangle::logging::{init_logging, LoggingConfig};

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    let config = AppConfig::indexed().with_args(std::env::args().skip(1));
    if let Err(err) = app::launch(&config) {
        log::error!("{err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
