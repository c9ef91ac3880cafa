// Adapters layer: concrete catalog implementations.

pub mod memory;
pub mod stash;

pub use memory::InMemoryCatalog;
pub use stash::StashClient;
