// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for path resolution and value access.

/// Result alias for path resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Result alias for reading and writing through a location.
pub type AccessResult<T> = Result<T, AccessError>;

/// Failure to turn a path into a location.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A segment names no member of the owning type.
    #[error("no member `{member}` on type `{ty}`")]
    MemberNotFound {
        /// Owning type.
        ty: String,
        /// Requested member name.
        member: String,
    },
    /// An index suffix is past the end of the collection.
    #[error("index {index} out of range for `{path}` (length {len})")]
    IndexOutOfRange {
        /// Path of the collection.
        path: String,
        /// Requested index.
        index: usize,
        /// Current length.
        len: usize,
    },
    /// An index suffix was applied to a non-collection.
    #[error("`{path}` is not a collection")]
    NotACollection {
        /// Path of the indexed location.
        path: String,
    },
    /// The path text is malformed.
    #[error("invalid path `{path}`: {reason}")]
    InvalidPath {
        /// The offending path text.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// A location id no longer refers to a live location.
    #[error("location is no longer valid")]
    StaleLocation,
}

impl ResolveError {
    pub(crate) fn invalid(path: &str, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.to_owned(),
            reason,
        }
    }
}

/// Failure to read or write a value through a location.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The target is read-only (declared so, computed, or reached through a computed member).
    #[error("`{path}` is read-only")]
    ReadOnly {
        /// Path of the target.
        path: String,
    },
    /// The value does not fit the declared type.
    #[error("expected `{expected}`, found {found}")]
    TypeMismatch {
        /// Declared type.
        expected: String,
        /// Shape of the rejected value.
        found: &'static str,
    },
    /// The store cannot reach the target, e.g. through a null reference.
    #[error("`{path}` is unreachable")]
    Unreachable {
        /// Path of the target.
        path: String,
    },
    /// The collection has a fixed length.
    #[error("`{path}` has a fixed length of {len}")]
    FixedSize {
        /// Path of the collection.
        path: String,
        /// The fixed length.
        len: usize,
    },
    /// The location was dropped by a structural change.
    #[error("location is no longer valid")]
    Stale,
}

impl AccessError {
    pub(crate) fn unreachable(path: impl Into<String>) -> Self {
        Self::Unreachable { path: path.into() }
    }

    pub(crate) fn read_only(path: impl Into<String>) -> Self {
        Self::ReadOnly { path: path.into() }
    }
}
