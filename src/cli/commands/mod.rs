mod build;
mod outline;
mod config;

pub use build::handle_build_command;
pub use outline::handle_outline_command;
pub use config::handle_check_config_command;
