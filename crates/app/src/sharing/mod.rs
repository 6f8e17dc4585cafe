//! Share link commands and queries.

mod generate;
mod get_shared;
mod shared_with_me;

pub use generate::{GenerateShareLink, GenerateShareLinkHandler};
pub use get_shared::{GetSharedWishlist, GetSharedWishlistHandler};
pub use shared_with_me::{GetWishlistsSharedWithMe, GetWishlistsSharedWithMeHandler};
