//! Tojumi Admin library.
//!
//! Server-rendered administration panel for the Tojumi care marketplace.
//! Staff review and approve registrations from families, care businesses,
//! students, care homes and guarantors, and manage care service types.
//!
//! The panel holds no data of its own: every read and write goes through the
//! Tojumi GraphQL API using the logged-in operator's bearer token.
//!
//! # Layout
//!
//! - [`api`] - GraphQL client, operations and remote record types
//! - [`repository`] - Repository traits with GraphQL implementations
//! - [`store`] - Per-entity fetch state and action tracking
//! - [`routes`] - Axum handlers and askama templates
//! - [`middleware`] - Session guard, request IDs, security headers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state;
pub mod store;

pub use routes::app;
pub use state::AppState;
