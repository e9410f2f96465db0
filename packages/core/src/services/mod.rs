//! Business Services
//!
//! This module contains the content tree services:
//!
//! - `ContentService` - tree mutations, resolved reads, rendering, GC
//! - `ReferenceResolver` - batch dereferencing of reference slots
//! - `garbage_collector` - fixed-point sweep over one root's tree
//! - `renderer` - public JSON view of a root
//!
//! Services coordinate between the database layer and callers. They never
//! issue SQL; every mutation goes through one `WriteBatch`.

pub mod content_service;
pub mod error;
pub mod garbage_collector;
mod keys;
pub mod renderer;
pub mod resolver;

pub use content_service::{ContentService, DEFAULT_EVENT_CHANNEL_CAPACITY, MAX_LIST_ROWS};
pub use error::{ContentServiceError, ErrorKind};
pub use garbage_collector::CollectionReport;
pub use keys::normalize_key;
pub use renderer::render_tree;
pub use resolver::ReferenceResolver;
