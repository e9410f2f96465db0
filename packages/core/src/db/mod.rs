//! Database Layer
//!
//! This module handles all database interactions using embedded libsql:
//!
//! - Database initialization and connection management (`DatabaseService`)
//! - The `ContentStore` trait the services are written against
//! - `TursoStore`, the libsql implementation of `ContentStore`
//! - Domain events announced after each committed write batch
//!
//! # Architecture
//!
//! Services never issue SQL. They read through predicate queries and write
//! through `WriteBatch`es, which the store applies in a single transaction.

mod content_store;
mod database;
mod error;
pub mod events;
mod turso_store;

pub use content_store::{
    BatchOutcome, ContentQuery, ContentStore, PropertyQuery, WriteBatch, WriteOp,
};
pub use database::DatabaseService;
pub use error::DatabaseError;
pub use events::ContentEvent;
pub use turso_store::TursoStore;
