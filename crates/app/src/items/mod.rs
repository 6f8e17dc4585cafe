//! Wishlist item commands.

mod create;
mod delete;
mod reorder;
mod reserve;
mod update;

pub use create::{CreateWishlistItem, CreateWishlistItemHandler};
pub use delete::{DeleteWishlistItem, DeleteWishlistItemHandler};
pub use reorder::{ReorderWishlistItems, ReorderWishlistItemsHandler};
pub use reserve::{ToggleItemReservation, ToggleItemReservationHandler};
pub use update::{UpdateWishlistItem, UpdateWishlistItemHandler};

use common::{ItemId, WishlistId};
use domain::{Wishlist, WishlistItem};
use store::{ItemRepository, Session, WishlistRepository};

use crate::error::AppError;

/// Re-ranks sibling items dense zero-based, newest first on top.
///
/// Ties on creation time fall back to the current order so the result stays
/// deterministic.
pub(crate) fn rerank_by_recency(items: &mut [WishlistItem]) {
    items.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then(b.order().cmp(&a.order()))
    });
    let count = items.len() as i32;
    for (index, item) in items.iter_mut().enumerate() {
        item.reorder(count - 1 - index as i32);
    }
}

/// Sorts for display: highest order first.
pub(crate) fn sort_for_display(items: &mut [WishlistItem]) {
    items.sort_by(|a, b| b.order().cmp(&a.order()));
}

/// Loads an item and its wishlist, verifying they belong together.
///
/// The item/wishlist mismatch is a request-shape problem, not a missing
/// entity, hence BadRequest.
pub(crate) async fn load_item_in_wishlist(
    session: &dyn Session,
    item_id: &ItemId,
    wishlist_id: &WishlistId,
) -> Result<(WishlistItem, Wishlist), AppError> {
    let item = session
        .item(item_id)
        .await?
        .ok_or_else(|| AppError::not_found("item", item_id))?;
    if item.wishlist_id() != *wishlist_id {
        return Err(AppError::bad_request(
            "item does not belong to the given wishlist",
        ));
    }
    let wishlist = session
        .wishlist(wishlist_id)
        .await?
        .ok_or_else(|| AppError::not_found("wishlist", wishlist_id))?;
    Ok((item, wishlist))
}
