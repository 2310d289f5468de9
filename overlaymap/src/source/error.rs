//! Source normalization errors.

use thiserror::Error;

/// Errors produced while turning a raw source into a layer.
///
/// None of these are retried; a failing source is dropped and reported.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The input was recognised but its contents are malformed.
    #[error("Failed to parse '{file}': {message}")]
    Parse { file: String, message: String },

    /// The file extension is not one the normalizer understands.
    #[error("Unsupported format for '{file}' (extension: {extension})")]
    UnsupportedFormat { file: String, extension: String },

    /// A bundle group has no mandatory geometry component, or is empty.
    #[error("Bundle '{group}' is missing its {component} component")]
    MissingComponent { group: String, component: String },

    #[error("Failed to read '{file}': {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// The blocking load task panicked or was aborted.
    #[error("Background load of '{file}' failed: {message}")]
    Spawn { file: String, message: String },
}

impl SourceError {
    pub(crate) fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(file: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            file: file.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_file() {
        let err = SourceError::parse("rivers.geojson", "expected value at line 1");
        let message = err.to_string();
        assert!(message.contains("rivers.geojson"));
        assert!(message.contains("expected value"));
    }

    #[test]
    fn test_missing_component_message() {
        let err = SourceError::MissingComponent {
            group: "parcels".to_string(),
            component: ".shp".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Bundle 'parcels' is missing its .shp component"
        );
    }
}
