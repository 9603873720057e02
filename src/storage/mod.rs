//! Pluggable byte storage for persisted models.
//!
//! Backends: [`FileStorage`] for a directory on disk and [`MemoryStorage`]
//! for tests and throwaway engines.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::*;
pub use memory::*;
pub use traits::*;
