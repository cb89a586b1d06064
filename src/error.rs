//! Error types for route registration, configuration and serving.
//!
//! # Design
//!
//! This module uses an opaque `Error` struct paired with an `ErrorKind` enum,
//! following the `std::io::Error` pattern. Internal error sources can change
//! without breaking consumers.
//!
//! Errors only happen at startup: while loading configuration, while registering
//! route groups or while binding the listener. Dispatch itself never fails;
//! unmatched requests are answered by the router's not-found policy.
//!
//! # Example
//!
//! ```rust
//! use axum_routegroup::{Error, ErrorKind};
//!
//! let error = Error::route_conflict("GET /users is already registered");
//!
//! match error.kind() {
//!     ErrorKind::RouteConflict => println!("Conflict: {}", error),
//!     ErrorKind::InvalidRoute => println!("Bad pattern: {}", error),
//!     _ => println!("Other error: {}", error),
//! }
//! assert_eq!(error.error_code(), "ROUTE_CONFLICT");
//! ```

use std::fmt;
use thiserror::Error;

/// The kind of error that occurred.
///
/// This enum is marked `#[non_exhaustive]`, so new variants may be added
/// in future versions without breaking existing code. Always include a
/// wildcard arm when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Two registrations claim the same method and pattern, or the path
    /// engine rejected a pattern because it overlaps an existing one.
    #[error("route conflict")]
    RouteConflict,

    /// The route pattern is malformed (bad parameter or catch-all segment).
    #[error("invalid route")]
    InvalidRoute,

    /// Configuration error (invalid TOML, missing values).
    #[error("configuration error")]
    Configuration,

    /// I/O error (file operations, network).
    #[error("I/O error")]
    Io,

    /// Internal/unexpected error.
    #[error("internal error")]
    Internal,
}

/// An error that can occur in the axum-routegroup library.
///
/// Use [`Error::kind()`] to determine the category of error for matching,
/// and the `Display` implementation to get a human-readable message.
pub struct Error {
    kind: ErrorKind,
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl Error {
    /// Creates a new error with the given kind and source.
    ///
    /// ```rust
    /// use axum_routegroup::{Error, ErrorKind};
    ///
    /// let err = Error::new(ErrorKind::Internal, "something went wrong");
    /// assert_eq!(err.kind(), ErrorKind::Internal);
    /// ```
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self {
            kind,
            source: error.into(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns a stable identifier for this error, suitable for logs and
    /// startup diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ErrorKind::RouteConflict => "ROUTE_CONFLICT",
            ErrorKind::InvalidRoute => "INVALID_ROUTE",
            ErrorKind::Configuration => "CONFIG_ERROR",
            ErrorKind::Io => "IO_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// Consumes the error and returns the inner error source.
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self.source
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl Error {
    /// Creates a route conflict error.
    pub fn route_conflict(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::RouteConflict, msg.into())
    }

    /// Creates an invalid route error.
    pub fn invalid_route(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRoute, msg.into())
    }

    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, msg.into())
    }

    /// Creates an I/O error from a `std::io::Error`.
    pub fn from_io(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err)
    }

    /// Creates an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, msg.into())
    }
}

// ============================================================================
// Trait implementations
// ============================================================================

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

// ============================================================================
// From implementations
// ============================================================================

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<std::net::AddrParseError> for Error {
    fn from(err: std::net::AddrParseError) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<matchit::InsertError> for Error {
    fn from(err: matchit::InsertError) -> Self {
        let kind = match err {
            matchit::InsertError::Conflict { .. } => ErrorKind::RouteConflict,
            _ => ErrorKind::InvalidRoute,
        };
        Self::new(kind, err)
    }
}

// ============================================================================
// Tests
// ============================================================================
