//! Error types for the API console.
//!
//! # Design
//! Configuration problems (bad labels, empty or unmatched path parameters)
//! and network failures both end the current invocation and are shown to
//! the user as a `Failure` outcome, so their `Display` text is written to be
//! read by a person. A non-2xx status is not an error at all and never
//! appears here.

use thiserror::Error;

/// A parameter set that cannot be turned into a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// The label is not of the form `"<name> (<location>)"`.
    #[error("malformed parameter label: {0:?}")]
    MalformedLabel(String),

    /// The parenthesized location is not one of query, path, body, header.
    #[error("unknown parameter location: {0:?}")]
    UnknownLocation(String),

    #[error("path parameter cannot be empty: {0}")]
    EmptyPathParameter(String),

    /// The path template has a `{name}` placeholder with no path parameter.
    #[error("unresolved path placeholder: {{{0}}}")]
    UnresolvedPlaceholder(String),

    /// A path parameter names no placeholder in the template.
    #[error("path parameter {0} does not appear in the path template")]
    UnusedPathParameter(String),
}

/// The request never produced a response (DNS, refused connection, abort).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);
