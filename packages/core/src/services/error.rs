//! Service Layer Error Types
//!
//! This module defines error types for content tree operations. Callers map
//! them to their own transport through [`ContentServiceError::kind`].

use crate::db::DatabaseError;
use crate::models::{ContentId, PropertyId, UserId};
use thiserror::Error;

/// Coarse classification of service errors
///
/// An HTTP layer maps `NotFound` to 404, `InvalidArgument` to 400,
/// `Unauthorized` to 401 and `Internal` to 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Unauthorized,
    Internal,
}

/// Content service operation errors
#[derive(Error, Debug)]
pub enum ContentServiceError {
    /// Content node not found by ID
    #[error("Content not found: {id}")]
    ContentNotFound { id: ContentId },

    /// Property not found by ID
    #[error("Property not found: {id}")]
    PropertyNotFound { id: PropertyId },

    /// Index out of range, bad permutation, mismatched root, ...
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Reference slots form a cycle
    #[error("Circular reference detected: {context}")]
    CircularReference { context: String },

    /// Token did not verify for the user
    #[error("Unauthorized for user {user_id}")]
    Unauthorized { user_id: UserId },

    /// Database operation failed
    #[error("Database operation failed: {0}")]
    DatabaseError(#[from] DatabaseError),
}

impl ContentServiceError {
    /// Create a content not found error
    pub fn content_not_found(id: ContentId) -> Self {
        Self::ContentNotFound { id }
    }

    /// Create a property not found error
    pub fn property_not_found(id: PropertyId) -> Self {
        Self::PropertyNotFound { id }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a circular reference error
    pub fn circular_reference(context: impl Into<String>) -> Self {
        Self::CircularReference {
            context: context.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(user_id: UserId) -> Self {
        Self::Unauthorized { user_id }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ContentNotFound { .. } | Self::PropertyNotFound { .. } => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::CircularReference { .. } | Self::DatabaseError(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
