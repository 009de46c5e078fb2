//! Session domain module.
//!
//! Owns the process-wide answer to "who is signed in and which profile
//! applies to them".
//!
//! # Module Structure
//!
//! - `snapshot`: Externally observable session state (`SessionSnapshot`)
//! - `provider`: Identity provider interface (`IdentityProvider`, `Resolution`)
//! - `synthetic`: Demo-mode provider with a fixed identity
//! - `remote`: Live-mode provider backed by the remote auth client and profile store
//! - `observer`: Listener registry with explicit unsubscribe handles
//! - `manager`: Session state machine (`SessionManager`)
//!
//! # Usage
//!
//! ```ignore
//! use biglabs_core::session::{SessionManager, SyntheticIdentityProvider};
//!
//! let manager = SessionManager::start(Arc::new(SyntheticIdentityProvider::new()))?;
//! assert!(manager.snapshot().identity.is_some());
//! ```

mod manager;
mod observer;
mod provider;
mod remote;
mod snapshot;
mod synthetic;

// Re-export public API
pub use manager::SessionManager;
pub use observer::{SessionListener, Subscription};
pub use provider::{IdentityProvider, Resolution};
pub use remote::RemoteIdentityProvider;
pub use snapshot::SessionSnapshot;
pub use synthetic::SyntheticIdentityProvider;
