//! Authentication domain module.
//!
//! # Module Structure
//!
//! - `mode`: Demo/Live mode selection (`AppMode`, `decide_mode`)
//! - `model`: Identity and remote session types
//! - `client`: Remote authentication client trait and change stream
//!
//! # Usage
//!
//! ```ignore
//! use biglabs_core::auth::{decide_mode, AppMode, RemoteAuthClient};
//! ```

mod client;
mod mode;
mod model;

// Re-export public API
pub use client::{AuthChangeStream, RemoteAuthClient};
pub use mode::{AppMode, decide_mode};
pub use model::{
    AuthChange, AuthEvent, AuthSession, AuthUser, Identity, SessionToken, SignUpAttributes,
    SignUpOutcome,
};
