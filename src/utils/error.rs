use std::error::Error;
use std::fmt;
use std::io;

/// Common result type for application-level operations
pub type BoxResult<T> = Result<T, Box<dyn Error>>;

/// Error types for pagetoc operations
#[derive(Debug)]
pub enum PagetocError {
    /// IO error wrapper
    Io(io::Error),
    /// Configuration file could not be loaded or is incomplete
    Config(String),
    /// Builder configuration does not resolve against the document
    Configuration(String),
    /// A synthesized identifier collides with one already in the document
    Resolution(String),
    /// Selector pattern syntax error
    Selector(String),
    /// HTML parsing or serialization error
    Html(String),
    /// Generic error message
    Generic(String),
}

impl fmt::Display for PagetocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PagetocError::Io(err) => write!(f, "IO error: {}", err),
            PagetocError::Config(msg) => write!(f, "Configuration file error: {}", msg),
            PagetocError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            PagetocError::Resolution(msg) => write!(f, "Resolution error: {}", msg),
            PagetocError::Selector(msg) => write!(f, "Selector error: {}", msg),
            PagetocError::Html(msg) => write!(f, "HTML error: {}", msg),
            PagetocError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for PagetocError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PagetocError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for PagetocError {
    fn from(err: io::Error) -> Self {
        PagetocError::Io(err)
    }
}

impl From<String> for PagetocError {
    fn from(msg: String) -> Self {
        PagetocError::Generic(msg)
    }
}

impl From<&str> for PagetocError {
    fn from(msg: &str) -> Self {
        PagetocError::Generic(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = PagetocError::Configuration("no container".to_string());
        assert_eq!(err.to_string(), "Configuration error: no container");

        let err = PagetocError::Resolution("id taken".to_string());
        assert_eq!(err.to_string(), "Resolution error: id taken");

        let err: PagetocError = "plain".into();
        assert_eq!(err.to_string(), "plain");
    }

    #[test]
    fn test_io_source() {
        let err: PagetocError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("IO error"));
    }
}
