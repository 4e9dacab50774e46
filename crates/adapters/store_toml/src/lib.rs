//! # neohub-adapter-store-toml
//!
//! File-backed implementation of the `AddressStore` port.
//!
//! ## Responsibilities
//! - Persist the last discovered hub (`address`, `device_id`) so the next
//!   start can skip discovery
//! - Forget it when connecting to that address fails
//! - Leave unrelated keys in the file untouched
//!
//! ## Dependency rule
//! Depends on `neohub-app` (for the port trait) and `neohub-domain` (for
//! `HubIdentity`). The `app` and `domain` crates must never reference this
//! adapter.

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::{StoreConfig, TomlAddressStore};
