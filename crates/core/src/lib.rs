//! Tojumi Core - Shared types library.
//!
//! This crate provides the types used by the Tojumi admin dashboard:
//! - `admin` - Internal administration panel for the care marketplace
//! - `integration-tests` - End-to-end tests against a mock API
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and trivially testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, approval status, levels, emails and money
//! - [`pagination`] - Client-side pagination with query-string synchronisation
//! - [`filter`] - Status filters for list pages
//! - [`format`] - Display helpers shared by templates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod filter;
pub mod format;
pub mod pagination;
pub mod types;

pub use filter::{StatusFilter, VerificationFilter};
pub use pagination::{Page, Pagination, PaginationError, PaginationOptions};
pub use types::*;
