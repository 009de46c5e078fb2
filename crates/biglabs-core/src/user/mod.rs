//! User domain module.
//!
//! # Module Structure
//!
//! - `model`: Profile domain model and partial updates
//! - `demo`: Fixed identity and profile used in demo mode
//! - `repository`: Profile store trait

mod demo;
mod model;
mod repository;

// Re-export public API
pub use demo::{DEMO_USER_ID, demo_identity, demo_profile};
pub use model::{Profile, ProfileUpdate};
pub use repository::ProfileRepository;
