//! Device capabilities used by request handlers.
//!
//! Both are plain values owned by whoever needs them; there is no global
//! state.

pub mod clock;
pub mod store;

pub use clock::{SntpClock, SyncError, TimeSource};
pub use store::{ByteStore, FileStore, MemoryStore, StoreError, StoreExt};
