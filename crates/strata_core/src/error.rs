//! # Storage Error Types
//!
//! Every failure the storage layer can report. Mutating paths that receive
//! an invalid handle panic with one of these formatted into the message;
//! query paths collapse them into `None`.

use thiserror::Error;

use crate::memory::Handle;

/// Why a handle failed validation against its allocator.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleError {
    /// The slot index was never issued by this allocator.
    #[error("handle {handle} is out of range: allocator has {slot_count} slots")]
    OutOfRange {
        /// The offending handle.
        handle: Handle,
        /// Number of slots the allocator has issued.
        slot_count: usize,
    },

    /// The slot exists but is currently free.
    #[error("handle {handle} refers to a vacant slot")]
    Vacant {
        /// The offending handle.
        handle: Handle,
    },

    /// The slot was freed and reissued since this handle was created.
    #[error("handle {handle} is stale: slot is now at generation {current}")]
    Stale {
        /// The offending handle.
        handle: Handle,
        /// Generation currently stored in the slot.
        current: u32,
    },
}

/// Result type for handle validation.
pub type HandleResult<T> = Result<T, HandleError>;

/// Errors raised by tag-keyed catalogs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A bucket with this tag already exists.
    #[error("duplicate tag: {0}")]
    DuplicateTag(String),

    /// No bucket carries this tag.
    #[error("unknown tag: {0}")]
    UnknownTag(String),

    /// Tags must contain at least one byte.
    #[error("tag must not be empty")]
    EmptyTag,

    /// The tag exceeds the bounded tag length.
    #[error("tag is {len} bytes, limit is {max}")]
    TagTooLong {
        /// Length of the rejected tag in bytes.
        len: usize,
        /// Maximum accepted length in bytes.
        max: usize,
    },

    /// No asset type is registered under this name.
    #[error("unknown asset kind: {0}")]
    UnknownKind(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while loading storage configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("invalid configuration syntax: {0}")]
    Parse(String),

    /// A value parsed but is out of its accepted range.
    #[error("invalid configuration value: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
