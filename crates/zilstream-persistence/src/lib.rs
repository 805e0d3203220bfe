//! Local persistence for ZilStream.
//!
//! Keeps user state between runs as JSON blobs under string keys, the same
//! shape a browser's local storage would hold:
//! - `KeyValueStore`: the storage seam (`FileStore` on disk, `MemoryStore` in tests)
//! - `StateArchive`: typed load/save of account, alerts, settings, notifications,
//!   favorites, selected currency and the active wallet provider

pub mod archive;
pub mod error;
pub mod kv;

pub use archive::{keys, StateArchive};
pub use error::{PersistenceError, PersistenceResult};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
