//! Error handling for content-model
//!
//! This module provides the error type shared by every content-model operation.
//! All errors implement the standard `std::error::Error` trait.
//!
//! # Error Types
//!
//! - [`Error::ParseError`] - block grammar and definition parsing errors
//! - [`Error::BindingError`] - binding declarations a content model refuses
//! - [`Error::CoercionError`] - stored field text that does not fit its type
//! - [`Error::RegistryError`] - content type registration errors
//! - [`Error::HydrateError`] - hydration errors that cannot degrade to defaults
//! - [`Error::JsonError`] - JSON parsing and serialization errors
//! - [`Error::IoError`] - file system and I/O errors
//!
//! Most of the binding engine is deliberately permissive: unknown bindings,
//! missing field values and structural mismatches are logged, not returned.
//! The variants above cover what remains.
//!
//! # Usage
//!
//! ```rust,ignore
//! use content_model::{parse_blocks, Error};
//!
//! match parse_blocks("<!-- wp:group -->") {
//!     Ok(blocks) => println!("parsed {} blocks", blocks.len()),
//!     Err(Error::ParseError(msg)) => println!("Parse error: {}", msg),
//!     Err(err) => println!("Other error: {}", err),
//! }
//! ```

use std::borrow::Cow;
use thiserror::Error;

/// Error type for all content-model operations
#[derive(Error, Debug)]
pub enum Error {
    /// Block grammar, template and definition parsing errors
    ///
    /// Occurs when serialized blocks have unbalanced or mismatched delimiters,
    /// or when block attributes are not a JSON object.
    #[error("Parse error: {0}")]
    ParseError(Cow<'static, str>),

    /// Binding declarations rejected by the configured policy
    ///
    /// Only raised when [`BodyBindingPolicy::Reject`] is configured and a
    /// template binds more than one region to the body field.
    ///
    /// [`BodyBindingPolicy::Reject`]: crate::types::BodyBindingPolicy::Reject
    #[error("Binding error: {0}")]
    BindingError(Cow<'static, str>),

    /// Field text that cannot be cast to its declared type
    ///
    /// Only raised in [`CoercionMode::Strict`]; the permissive mode degrades
    /// to the zero value of the type instead.
    ///
    /// [`CoercionMode::Strict`]: crate::types::CoercionMode::Strict
    #[error("Coercion error: {0}")]
    CoercionError(Cow<'static, str>),

    /// Content type registration errors
    #[error("Registry error: {0}")]
    RegistryError(Cow<'static, str>),

    /// Hydration errors
    #[error("Hydrate error: {0}")]
    HydrateError(Cow<'static, str>),

    /// JSON parsing and serialization errors
    ///
    /// Automatically converted from `serde_json::Error` when JSON operations fail.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File system and I/O errors
    ///
    /// Automatically converted from `std::io::Error` when file operations fail.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Create a parse error with an owned string
    ///
    /// Use this for dynamic error messages that include runtime context.
    pub fn parse_owned(msg: String) -> Self {
        Error::ParseError(Cow::Owned(msg))
    }

    /// Create a binding error with an owned string
    pub fn binding_owned(msg: String) -> Self {
        Error::BindingError(Cow::Owned(msg))
    }

    /// Create a coercion error with an owned string
    pub fn coercion_owned(msg: String) -> Self {
        Error::CoercionError(Cow::Owned(msg))
    }

    /// Create a registry error with a static string
    pub fn registry_static(msg: &'static str) -> Self {
        Error::RegistryError(Cow::Borrowed(msg))
    }

    /// Create a registry error with an owned string
    pub fn registry_owned(msg: String) -> Self {
        Error::RegistryError(Cow::Owned(msg))
    }

    /// Create a hydrate error with an owned string
    pub fn hydrate_owned(msg: String) -> Self {
        Error::HydrateError(Cow::Owned(msg))
    }

    /// Create an IO error carrying a message
    ///
    /// For more specific IO errors, use the standard `std::io::Error` constructors
    /// and let them be automatically converted.
    pub fn io(msg: String) -> Self {
        Error::IoError(std::io::Error::new(std::io::ErrorKind::Other, msg))
    }
}

/// Result type alias for content-model operations
pub type Result<T> = std::result::Result<T, Error>;
