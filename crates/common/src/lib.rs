//! Shared identifier types used across the wishlist service crates.

mod types;

pub use types::{ItemId, ShareCode, ShareLinkId, UserId, VisitId, WishlistId};
