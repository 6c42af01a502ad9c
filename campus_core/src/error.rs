use std::error::Error as StdError;
use std::fmt;

/// Failure classes the collaborating HTTP shell maps onto status codes.
/// Infra failures are the only retryable class; the core never retries
/// internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input. No state change.
    Validation,
    /// A referenced entity is absent. No state change.
    NotFound,
    /// The stored data violates an invariant (cyclic reply parentage,
    /// cross-thread parents). The operation is aborted whole.
    Integrity,
    /// The store is unreachable or failed mid-operation.
    Infra,
}

impl ErrorKind {
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Integrity => 409,
            ErrorKind::Infra => 500,
        }
    }

    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Infra)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not found",
            ErrorKind::Integrity => "integrity",
            ErrorKind::Infra => "infrastructure",
        };
        f.write_str(name)
    }
}

/// Classified wrapper every per-service error converts into at the crate
/// boundary.
#[derive(Debug)]
pub struct ServiceError {
    kind: ErrorKind,
    source: Box<dyn StdError + Send + Sync>,
}

impl ServiceError {
    pub fn validation(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            source: source.into(),
        }
    }

    pub fn not_found(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            source: source.into(),
        }
    }

    pub fn integrity(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            kind: ErrorKind::Integrity,
            source: source.into(),
        }
    }

    pub fn infra(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            kind: ErrorKind::Infra,
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.source)
    }
}

impl StdError for ServiceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorKind::Validation.http_status(), 400);
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::Integrity.http_status(), 409);
        assert_eq!(ErrorKind::Infra.http_status(), 500);
    }

    #[test]
    fn test_only_infra_is_retryable() {
        assert!(ErrorKind::Infra.is_retryable());
        assert!(!ErrorKind::Validation.is_retryable());
        assert!(!ErrorKind::NotFound.is_retryable());
        assert!(!ErrorKind::Integrity.is_retryable());
    }
}
