use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobScoutError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid selector: {0}")]
    SelectorError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Matcher '{portal}' failed: {message}")]
    MatcherError { portal: String, message: String },
}

impl JobScoutError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            JobScoutError::HttpError(_) => Some(
                "Check your internet connection, or save the page and pass it with:\n  jobscout detect <url> --html page.html"
            ),
            JobScoutError::TomlError(_) | JobScoutError::ConfigError(_) => Some(
                "Check ~/.config/jobscout/config.toml and portals.toml\nOr regenerate defaults with `jobscout init`"
            ),
            JobScoutError::SelectorError(_) => Some(
                "A selector in portals.toml is not valid CSS; fix it or delete the file to use the built-in portals"
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, JobScoutError>;
