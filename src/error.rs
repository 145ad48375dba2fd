/* src/error.rs */

use thiserror::Error;

/// Result type alias for operations that may fail with `ReqError`.
pub type Result<T> = std::result::Result<T, ReqError>;

/// Errors raised by the fallible building blocks of this crate.
///
/// The public accessors never return these; they degrade to a default value
/// or an empty string instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReqError {
    /// A trusted proxy entry is neither an IP address nor a CIDR range.
    #[error("Invalid network entry: {0}")]
    InvalidNetwork(String),

    /// A peer address could not be split into host and port.
    #[error("Invalid host:port address: {0:?}")]
    InvalidHostPort(String),

    /// The request body exceeds the form size limit.
    #[error("Form body too large: {size} bytes (limit {limit})")]
    FormTooLarge { size: usize, limit: usize },
}
