use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Pick the log level from the command line switches; `quiet` wins over `debug`
pub fn log_level(debug: bool, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initialize logging with the specified level
pub fn init_logging(level: LevelFilter) {
    // Logs go to stderr so HTML written to stdout stays clean
    if let Err(e) = SimpleLogger::new()
        .with_level(level)
        .with_colors(true)
        .init()
    {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

/// Configure backtrace if trace is enabled
pub fn configure_backtrace(trace: bool) {
    if trace {
        std::env::set_var("RUST_BACKTRACE", "1");
    }
}
