use super::Error;

/// Error when an entity or repository declaration is malformed.
///
/// This occurs when:
/// - An entity declares more than one id field
/// - A field uses a native type with no storage mapping and no converter
/// - A unique constraint or extension declaration references unknown fields
/// - An extension write exceeds the declared field envelope
///
/// These errors surface at metadata-build time and are never retried.
#[derive(Debug)]
pub(super) struct ConfigurationError {
    message: Box<str>,
}

impl std::error::Error for ConfigurationError {}

impl core::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid configuration: {}", self.message)
    }
}

impl Error {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Configuration(ConfigurationError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Configuration(_))
    }
}
