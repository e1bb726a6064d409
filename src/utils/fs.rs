use std::fs;
use std::path::{Path, PathBuf};
use std::io::{Read, Write};

use walkdir::WalkDir;

use crate::utils::error::{BoxResult, PagetocError};

/// File extensions treated as HTML documents
const HTML_EXTENSIONS: [&str; 2] = ["html", "htm"];

/// Create a directory and any parent directories if they don't exist
pub fn create_directory<P: AsRef<Path>>(path: P) -> BoxResult<()> {
    fs::create_dir_all(path.as_ref())?;
    Ok(())
}

/// Read a file to string
pub fn read_file<P: AsRef<Path>>(path: P) -> BoxResult<String> {
    let mut file = fs::File::open(path.as_ref())?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Write a string to a file, creating the file if it doesn't exist
pub fn write_file<P: AsRef<Path>>(path: P, contents: &str) -> BoxResult<()> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            create_directory(parent)?;
        }
    }

    let mut file = fs::File::create(path.as_ref())?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

/// Check if a path has one of the HTML extensions (case-insensitive)
pub fn is_html_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            let ext = ext.to_lowercase();
            HTML_EXTENSIONS.contains(&ext.as_str())
        })
}

/// List all HTML files below a directory, sorted by path
pub fn list_html_files<P: AsRef<Path>>(dir: P) -> BoxResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(PagetocError::Generic(format!(
            "Not a directory: {}", dir.display()
        )).into());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && is_html_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Map a file below `source_root` to the same relative location below `destination_root`
pub fn mirrored_path(file: &Path, source_root: &Path, destination_root: &Path) -> BoxResult<PathBuf> {
    let relative = file.strip_prefix(source_root).map_err(|_| {
        PagetocError::Generic(format!(
            "{} is not inside {}", file.display(), source_root.display()
        ))
    })?;
    Ok(destination_root.join(relative))
}
