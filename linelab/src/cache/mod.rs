//! Process-wide cache of line tables and cross-sections.
//!
//! The cache is an injected dependency: it is constructed with a data
//! directory and shared (`Arc`) between the dispatcher's execution units.
//! Tests build isolated instances over temporary directories.
//!
//! Two independent keyed stores live here, line tables and cross-sections,
//! sharing one name space for listing purposes. Writes to the same name are
//! serialized through a per-name lock so a save targeting table `X` is never
//! interleaved with another write to `X`; reads are lock-free snapshots of
//! the current entry.

mod store;
mod types;

pub use store::DataCache;
pub use types::CacheError;
