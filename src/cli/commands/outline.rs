use std::path::Path;

use pagetoc::toc::to_outline;
use pagetoc::utils::error::BoxResult;
use pagetoc::{TocConfig, TocEntry};

use crate::cli::commands::build::process_file;
use crate::cli::types::OutlineFormat;

/// Handle the outline command; the input file is left untouched
pub fn handle_outline_command(input: &Path, format: OutlineFormat, config: &TocConfig) -> BoxResult<()> {
    let (_, entries) = process_file(input, config)?;
    println!("{}", render_outline(&entries, format)?);
    Ok(())
}

fn render_outline(entries: &[TocEntry], format: OutlineFormat) -> BoxResult<String> {
    match format {
        OutlineFormat::Text => Ok(to_outline(entries).trim_end().to_string()),
        OutlineFormat::Json => Ok(serde_json::to_string_pretty(entries)?),
    }
}
