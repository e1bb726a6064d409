use pagetoc::utils::error::BoxResult;
use pagetoc::TocConfig;

/// Handle the check-config command
pub fn handle_check_config_command(config: &TocConfig) -> BoxResult<()> {
    println!("{}", serde_yaml::to_string(config)?.trim_end());
    Ok(())
}
