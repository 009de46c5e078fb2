//! File-backed storage for secrets and the persisted auth session.

pub mod secret_storage;
pub mod session_storage;

pub use secret_storage::{SecretStorage, SecretStorageError};
pub use session_storage::{SessionStorage, SessionStorageError};
