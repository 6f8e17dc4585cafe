//! Domain layer for the wishlist service.
//!
//! This crate provides:
//! - The aggregate entities (`User`, `Wishlist`, `WishlistItem`, `SharedLink`,
//!   `SharedLinkVisit`) with invariant-guarding operations
//! - Domain events raised by entity mutations and drained at the unit-of-work
//!   boundary
//! - The in-process event channel that publishes events to subscribers after
//!   a successful commit

pub mod channel;
pub mod error;
pub mod event;
pub mod item;
pub mod share;
pub mod user;
pub mod wishlist;

pub use channel::{EventChannel, EventSubscriber, SubscriberError};
pub use error::WishlistError;
pub use event::{DomainEvent, EventSource};
pub use item::WishlistItem;
pub use share::{SharedLink, SharedLinkVisit};
pub use user::User;
pub use wishlist::Wishlist;
