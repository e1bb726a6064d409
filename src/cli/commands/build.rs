use log::{debug, error, info};
use std::path::Path;

use pagetoc::utils::error::{BoxResult, PagetocError};
use pagetoc::utils::fs;
use pagetoc::{Document, TocBuilder, TocConfig, TocEntry};

/// Parse HTML, build the table of contents and serialize the result
pub fn process_html(html: &str, config: &TocConfig) -> BoxResult<(String, Vec<TocEntry>)> {
    let document = Document::parse(html)?;
    let entries = TocBuilder::new(config.clone()).build(&document)?;
    let output = document.to_html()?;
    Ok((output, entries))
}

/// Process one HTML file
pub fn process_file(input: &Path, config: &TocConfig) -> BoxResult<(String, Vec<TocEntry>)> {
    debug!("Processing {}", input.display());
    let html = fs::read_file(input)
        .map_err(|e| PagetocError::Generic(format!("Failed to read {}: {}", input.display(), e)))?;
    process_html(&html, config)
}

/// Handle the build command
pub fn handle_build_command(input: &Path, output: Option<&Path>, config: &TocConfig) -> BoxResult<()> {
    if input.is_dir() {
        let output = output.ok_or_else(|| {
            PagetocError::Generic("--output is required when INPUT is a directory".to_string())
        })?;
        return build_directory(input, output, config);
    }

    let (html, entries) = process_file(input, config)?;
    match output {
        Some(path) => {
            fs::write_file(path, &html)?;
            info!(
                "Wrote {} with {} table of contents entries",
                path.display(), entries.len()
            );
        }
        None => print!("{}", html),
    }
    Ok(())
}

/// Process every HTML file below `source`, mirroring the layout under `destination`
fn build_directory(source: &Path, destination: &Path, config: &TocConfig) -> BoxResult<()> {
    let files = fs::list_html_files(source)?;
    info!("Found {} HTML files in {}", files.len(), source.display());

    let mut failed = 0;
    for file in &files {
        let result = process_file(file, config).and_then(|(html, entries)| {
            let target = fs::mirrored_path(file, source, destination)?;
            fs::write_file(&target, &html)?;
            debug!("{} -> {} ({} entries)", file.display(), target.display(), entries.len());
            Ok(())
        });

        if let Err(e) = result {
            error!("{}: {}", file.display(), e);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(PagetocError::Generic(format!(
            "{} of {} files failed", failed, files.len()
        )).into());
    }

    info!("Processed {} files into {}", files.len(), destination.display());
    Ok(())
}
