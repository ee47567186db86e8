//! Authentication state for the client.
//!
//! This module provides:
//! - `AuthStore`: the persisted session with an explicit rehydration signal
//! - `DurableStorage` backends: files, the OS keychain, or memory
//! - `PageGate`: access decisions for protected pages
//!
//! The session snapshot and the bearer token live under separate storage keys
//! so outgoing requests can read the token synchronously.

pub mod credentials;
pub mod gate;
pub mod session;
pub mod storage;

pub use credentials::KeyringStorage;
pub use gate::{GateState, PageGate, Requirement};
pub use session::{AuthStore, Session, Snapshot, SNAPSHOT_KEY, TOKEN_KEY};
pub use storage::{DurableStorage, FileStorage, MemoryStorage};
