//! Error types for the discovery subsystem
//!
//! Only one recoverable error class exists here: duplicate registration.
//! Unknown lookups and queries against unbuilt engines return absent values
//! rather than errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A tool with this id is already registered. The registry is left
    /// exactly as it was before the failed call.
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),
}
