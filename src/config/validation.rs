use log::debug;

use crate::config::TocConfig;
use crate::document::SelectorList;
use crate::utils::error::{BoxResult, PagetocError};

/// Validate the configuration
pub fn validate_config(config: &TocConfig) -> BoxResult<()> {
    validate_toc_element(config)?;
    validate_title_elements(config)?;
    validate_list_id(config)?;
    Ok(())
}

fn validate_toc_element(config: &TocConfig) -> BoxResult<()> {
    if config.toc_element.trim().is_empty() {
        return Err(PagetocError::Config("'toc_element' must not be empty".to_string()).into());
    }

    SelectorList::parse(&config.toc_element).map_err(|e| {
        PagetocError::Config(format!("invalid 'toc_element' selector: {}", e))
    })?;

    debug!("Container selector: {}", config.toc_element);
    Ok(())
}

fn validate_title_elements(config: &TocConfig) -> BoxResult<()> {
    if config.title_elements.is_empty() {
        return Err(PagetocError::Config(
            "'title_elements' must list at least one selector".to_string()
        ).into());
    }

    for (index, pattern) in config.title_elements.iter().enumerate() {
        SelectorList::parse(pattern).map_err(|e| {
            PagetocError::Config(format!(
                "invalid selector for level {} in 'title_elements': {}", index + 1, e
            ))
        })?;
        debug!("Level {} headings: {}", index + 1, pattern);
    }

    Ok(())
}

fn validate_list_id(config: &TocConfig) -> BoxResult<()> {
    if config.list_id.is_empty() || config.list_id.chars().any(char::is_whitespace) {
        return Err(PagetocError::Config(format!(
            "'list_id' must be a non-empty identifier without whitespace, got {:?}", config.list_id
        )).into());
    }
    Ok(())
}
