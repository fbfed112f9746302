use super::Error;

/// Error when a value cannot be mapped between the Rust and storage type
/// systems. Fatal for the triggering call; never retried.
#[derive(Debug)]
pub(super) struct ConversionError {
    message: Box<str>,
}

impl std::error::Error for ConversionError {}

impl core::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "data conversion failed: {}", self.message)
    }
}

impl Error {
    /// Creates a conversion error.
    pub fn conversion(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Conversion(ConversionError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a conversion error.
    pub fn is_conversion(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Conversion(_))
    }
}
