//! In-process implementations of the repository traits.
//!
//! Used by the test suite and by the admin CLI's `--memory` mode.

mod memory_store;

pub use memory_store::MemoryStore;
