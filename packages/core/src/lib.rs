//! Contentree Core
//!
//! This crate provides the content tree engine behind a multi-tenant CMS:
//! documents made of typed nodes joined by named property edges.
//!
//! # Architecture
//!
//! - **Arena of ids**: nodes refer to children only through property ids, never
//!   in-memory pointers
//! - **Reference-counted lifetime**: a child lives while some reference slot
//!   holds a property pointing at it; the garbage collector reclaims the rest
//! - **libsql/Turso**: embedded SQLite-compatible storage, one transaction per
//!   logical mutation
//!
//! # Modules
//!
//! - [`models`] - Ids, content nodes, properties, partial updates, tree snapshots
//! - [`services`] - `ContentService`, resolver, renderer, garbage collector
//! - [`db`] - Database layer with libsql integration
//! - [`auth`] - Token verification seam
//! - [`config`] - Environment-driven configuration

pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use auth::{authorize, StaticTokenVerifier, TokenVerifier};
pub use config::{ConfigError, ContentreeConfig};
pub use db::{ContentEvent, ContentStore, DatabaseError, DatabaseService, TursoStore};
pub use models::*;
pub use services::*;
