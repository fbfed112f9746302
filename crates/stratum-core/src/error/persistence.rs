use super::Error;

/// A write violated a declared unique constraint.
///
/// Carries the constraint's final name and the human-readable message
/// declared alongside it, so callers can surface it without mapping
/// driver-specific failure text.
#[derive(Debug)]
pub(super) struct UniqueConstraintError {
    pub(super) name: Box<str>,
    pub(super) message: Box<str>,
}

impl std::error::Error for UniqueConstraintError {}

impl core::fmt::Display for UniqueConstraintError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unique constraint `{}` violated: {}", self.name, self.message)
    }
}

/// A write referenced a foreign row that does not exist, or severed one that
/// is still referenced.
#[derive(Debug)]
pub(super) struct ForeignConstraintError {
    pub(super) message: Box<str>,
}

impl std::error::Error for ForeignConstraintError {}

impl core::fmt::Display for ForeignConstraintError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "foreign constraint violated: {}", self.message)
    }
}

impl Error {
    /// Creates a unique constraint violation error.
    pub fn unique_constraint(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UniqueConstraint(UniqueConstraintError {
            name: name.into().into(),
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a unique constraint violation.
    pub fn is_unique_constraint(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UniqueConstraint(_))
    }

    /// Creates a foreign constraint violation error.
    pub fn foreign_constraint(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::ForeignConstraint(ForeignConstraintError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a foreign constraint violation.
    pub fn is_foreign_constraint(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ForeignConstraint(_))
    }
}
