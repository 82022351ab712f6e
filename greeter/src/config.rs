//! Application metadata

use serde::Serialize;

/// Descriptive metadata for the application, fixed at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// Human readable application name
    pub title: String,
    /// One line summary of what the application does
    pub description: String,
    /// Released version
    pub version: String,
}

impl Metadata {
    /// Creates metadata from its three parts
    pub fn new(title: impl Into<String>, description: impl Into<String>, version: impl Into<String>) -> Self {
        Metadata {
            title: title.into(),
            description: description.into(),
            version: version.into(),
        }
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata::new(
            "FastAPI Lambda",
            "A FastAPI application running on AWS Lambda",
            env!("CARGO_PKG_VERSION"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Metadata;

    #[test]
    fn default_metadata() {
        let metadata = Metadata::default();
        assert_eq!(metadata.title, "FastAPI Lambda");
        assert_eq!(metadata.description, "A FastAPI application running on AWS Lambda");
        assert_eq!(metadata.version, "1.0.0");
    }
}
