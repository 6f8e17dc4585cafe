//! Storage layer for the wishlist service.
//!
//! Handlers depend only on the repository capability traits and the
//! [`Session`] unit of work defined here; [`MemoryStore`] is the reference
//! implementation backing tests and local runs. A session stages writes in
//! isolation, applies them atomically on `commit`, enforces the unique
//! constraints of the data model, and dispatches the drained domain events
//! through the channel once the commit has succeeded.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::{MemorySession, MemoryStore};
pub use traits::{
    ItemRepository, Session, ShareLinkRepository, Store, UserRepository, VisitRepository,
    WishlistRepository,
};
