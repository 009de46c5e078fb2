//! Application layer for Biglabs.
//!
//! Account flows that coordinate the auth client, the profile store and the
//! session manager, plus the composition root that wires them for a process.

pub mod account_service;
pub mod bootstrap;

pub use account_service::{
    AccountService, DemoAccountService, RemoteAccountService, SignUpStatus, validate_new_password,
};
pub use bootstrap::AppBootstrap;
