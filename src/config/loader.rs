use std::path::{Path, PathBuf};
use std::fs;
use log::debug;

use crate::config::defaults::{self, CONFIG_FILES};
use crate::config::types::{TocConfig, TocConfigFile};
use crate::config::validation;
use crate::utils::error::{BoxResult, PagetocError};

/// Load the TOC configuration from config files, then apply command line overrides
///
/// When `config_files` is `None` the default file names are looked up in `base_dir`.
/// Files are merged in order; later files win key by key.
pub fn load_config<P: AsRef<Path>>(
    base_dir: P,
    config_files: Option<Vec<PathBuf>>,
    overrides: TocConfigFile,
) -> BoxResult<TocConfig> {
    let mut merged = TocConfigFile::default();

    let config_paths = match config_files {
        Some(paths) => paths,
        None => find_default_config_files(&base_dir),
    };

    if config_paths.is_empty() {
        debug!("No configuration files found, using command line options only");
    } else {
        for path in config_paths {
            debug!("Loading configuration from {}", path.display());
            merged.merge(read_config_file(&path)?);
        }
    }

    merged.merge(overrides);

    let config = resolve_config(merged)?;
    validation::validate_config(&config)?;

    debug!("Configuration loaded: {:?}", config);
    Ok(config)
}

/// Find default configuration files
fn find_default_config_files<P: AsRef<Path>>(base_dir: P) -> Vec<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| base_dir.as_ref().join(name))
        .filter(|path| path.exists())
        .collect()
}

/// Read and parse one configuration file, dispatching on its extension
fn read_config_file(config_path: &Path) -> BoxResult<TocConfigFile> {
    if !config_path.exists() {
        return Err(PagetocError::Config(format!(
            "Configuration file not found: {}", config_path.display()
        )).into());
    }

    let content = fs::read_to_string(config_path)
        .map_err(|e| PagetocError::Config(format!(
            "Failed to read configuration file {}: {}", config_path.display(), e
        )))?;

    let ext = config_path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());

    match ext.as_deref() {
        Some("yml") | Some("yaml") | None => parse_yaml_config(&content, config_path),
        Some("toml") => parse_toml_config(&content, config_path),
        Some("json") => parse_json_config(&content, config_path),
        Some(other) => Err(PagetocError::Config(format!(
            "Unsupported configuration file format: {}", other
        )).into()),
    }
}

/// Parse a YAML configuration file
fn parse_yaml_config(content: &str, path: &Path) -> BoxResult<TocConfigFile> {
    // An empty YAML document deserializes to null
    if content.trim().is_empty() {
        return Ok(TocConfigFile::default());
    }

    serde_yaml::from_str(content)
        .map_err(|e| PagetocError::Config(format!(
            "Failed to parse YAML configuration ({}): {}", path.display(), e
        )).into())
}

/// Parse a TOML configuration file
fn parse_toml_config(content: &str, path: &Path) -> BoxResult<TocConfigFile> {
    toml::from_str(content)
        .map_err(|e| PagetocError::Config(format!(
            "Failed to parse TOML configuration ({}): {}", path.display(), e
        )).into())
}

/// Parse a JSON configuration file
fn parse_json_config(content: &str, path: &Path) -> BoxResult<TocConfigFile> {
    serde_json::from_str(content)
        .map_err(|e| PagetocError::Config(format!(
            "Failed to parse JSON configuration ({}): {}", path.display(), e
        )).into())
}

/// Turn merged optional settings into a full configuration; the container and
/// heading selectors have no defaults
fn resolve_config(merged: TocConfigFile) -> BoxResult<TocConfig> {
    let toc_element = merged.toc_element.ok_or_else(|| {
        PagetocError::Config("missing required setting 'toc_element'".to_string())
    })?;
    let title_elements = merged.title_elements.ok_or_else(|| {
        PagetocError::Config("missing required setting 'title_elements'".to_string())
    })?;

    Ok(TocConfig {
        toc_element,
        title_elements,
        list_id: merged.list_id.unwrap_or_else(defaults::default_list_id),
        replace_existing: merged.replace_existing.unwrap_or(false),
    })
}
