use super::Error;

/// Error when a repository method cannot be bound to an executor.
///
/// Raised at repository-construction time: no strategy matched the method
/// descriptor, or the descriptor is malformed for the strategy that did
/// match (wrong parameter count, unknown field, invalid result shape).
#[derive(Debug)]
pub(super) struct RepositoryError {
    message: Box<str>,
}

impl std::error::Error for RepositoryError {}

impl core::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid repository: {}", self.message)
    }
}

impl Error {
    /// Creates a repository error.
    pub fn repository(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Repository(RepositoryError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a repository error.
    pub fn is_repository(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Repository(_))
    }
}
