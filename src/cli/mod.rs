pub mod types;
pub mod commands;
pub mod logging;

use clap::Parser;
use log::error;
use std::path::PathBuf;

use pagetoc::config::{self, TocConfigFile};
use pagetoc::utils::error::BoxResult;
use pagetoc::TocConfig;

/// Run the command-line interface; returns the process exit code
pub fn run() -> i32 {
    let cli = types::Cli::parse();

    // Initialize logging system
    logging::init_logging(logging::log_level(cli.debug, cli.quiet));

    // Configure backtrace
    logging::configure_backtrace(cli.trace);

    match dispatch(&cli) {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

fn dispatch(cli: &types::Cli) -> BoxResult<()> {
    match &cli.command {
        types::Commands::Build { input, output, toc } => {
            let config = load(cli, toc.to_config_file())?;
            commands::handle_build_command(input, output.as_deref(), &config)
        }
        types::Commands::Outline { input, format, toc } => {
            let config = load(cli, toc.to_config_file())?;
            commands::handle_outline_command(input, *format, &config)
        }
        types::Commands::CheckConfig { toc } => {
            let config = load(cli, toc.to_config_file())?;
            commands::handle_check_config_command(&config)
        }
    }
}

fn load(cli: &types::Cli, overrides: TocConfigFile) -> BoxResult<TocConfig> {
    config::load_config(PathBuf::from("."), cli.config.clone(), overrides)
}
