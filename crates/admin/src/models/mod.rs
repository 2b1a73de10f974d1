//! Session-held models for the admin panel.
//!
//! Entity records are never stored here; they come from the API on every
//! page load. The session only carries who the operator is, their API token
//! and any one-shot notices waiting to be shown.

pub mod notice;
pub mod session;

pub use notice::{Notice, NoticeKind};
pub use session::{CurrentAdmin, keys as session_keys};
