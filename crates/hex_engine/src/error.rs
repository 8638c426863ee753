//! Core error types shared by the entity store, scheduler and event queue

use std::fmt;
use thiserror::Error;

/// Result alias used by the core subsystems
pub type HexResult<T> = Result<T, HexError>;

/// Boxed error returned by user code (systems, listeners)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Subsystem that raised an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorDomain {
    /// System scheduler
    System,
    /// Entity-component store
    Entity,
    /// Event queue
    Event,
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::System => "System",
            Self::Entity => "Entity",
            Self::Event => "Event",
        };
        f.write_str(name)
    }
}

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Referenced entity, system, component or kind does not exist
    NotFound,
    /// Duplicate registration
    Exists,
    /// A stored value did not have the type its kind promised
    TypeMismatch,
    /// A dependency edge would close a cycle
    Cycle,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "Not Found",
            Self::Exists => "Already Exists",
            Self::TypeMismatch => "Type Mismatch",
            Self::Cycle => "Cycle Detected",
        };
        f.write_str(label)
    }
}

/// Error raised by the core subsystems
///
/// Every constructor logs the error at error severity, so callers only
/// have to decide whether to recover.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Hex{domain}: {kind}: {message}")]
pub struct HexError {
    domain: ErrorDomain,
    kind: ErrorKind,
    message: String,
}

impl HexError {
    /// Create and log a new error
    pub fn new(domain: ErrorDomain, kind: ErrorKind, message: impl Into<String>) -> Self {
        let error = Self {
            domain,
            kind,
            message: message.into(),
        };
        log::error!("{}", error);
        error
    }

    /// Shorthand for a `NotFound` error
    pub fn not_found(domain: ErrorDomain, message: impl Into<String>) -> Self {
        Self::new(domain, ErrorKind::NotFound, message)
    }

    /// Shorthand for an `Exists` error
    pub fn exists(domain: ErrorDomain, message: impl Into<String>) -> Self {
        Self::new(domain, ErrorKind::Exists, message)
    }

    /// Shorthand for a `TypeMismatch` error
    pub fn type_mismatch(domain: ErrorDomain, message: impl Into<String>) -> Self {
        Self::new(domain, ErrorKind::TypeMismatch, message)
    }

    /// Shorthand for a `Cycle` error
    pub fn cycle(domain: ErrorDomain, message: impl Into<String>) -> Self {
        Self::new(domain, ErrorKind::Cycle, message)
    }

    /// Subsystem that raised the error
    pub fn domain(&self) -> ErrorDomain {
        self.domain
    }

    /// Error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Detail message
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let err = HexError::not_found(ErrorDomain::Entity, "3");
        assert_eq!(err.to_string(), "HexEntity: Not Found: 3");

        let err = HexError::cycle(ErrorDomain::System, "A -> B");
        assert_eq!(err.to_string(), "HexSystem: Cycle Detected: A -> B");
    }

    #[test]
    fn test_accessors() {
        let err = HexError::exists(ErrorDomain::Event, "listener");
        assert_eq!(err.kind(), ErrorKind::Exists);
        assert_eq!(err.domain(), ErrorDomain::Event);
        assert_eq!(err.message(), "listener");
    }

    #[test]
    fn test_boxes_into_box_error() {
        let boxed: BoxError = HexError::type_mismatch(ErrorDomain::Entity, "x").into();
        assert!(boxed.to_string().contains("Type Mismatch"));
    }
}
