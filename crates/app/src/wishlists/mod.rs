//! Wishlist commands and queries.

mod create;
mod delete;
mod get;
mod list;
mod reorder;
mod update;

pub use create::{CreateWishlist, CreateWishlistHandler};
pub use delete::{DeleteWishlist, DeleteWishlistHandler};
pub use get::{GetWishlist, GetWishlistHandler};
pub use list::{GetWishlists, GetWishlistsHandler};
pub use reorder::{ReorderWishlists, ReorderWishlistsHandler};
pub use update::{UpdateWishlist, UpdateWishlistHandler};

use domain::Wishlist;
use store::{
    ItemRepository, Session, ShareLinkRepository, VisitRepository, WishlistRepository,
};

use crate::error::AppError;

/// Re-ranks sibling wishlists dense zero-based, newest first on top.
///
/// Ties on creation time fall back to the current order so the result stays
/// deterministic.
pub(crate) fn rerank_by_recency(wishlists: &mut [Wishlist]) {
    wishlists.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then(b.order().cmp(&a.order()))
    });
    let count = wishlists.len() as i32;
    for (index, wishlist) in wishlists.iter_mut().enumerate() {
        wishlist.reorder(count - 1 - index as i32);
    }
}

/// Sorts for display: highest order first.
pub(crate) fn sort_for_display(wishlists: &mut [Wishlist]) {
    wishlists.sort_by(|a, b| b.order().cmp(&a.order()));
}

/// Stages the removal of a wishlist with everything scoped to it: items, the
/// share link, and the link's visit records, all in the same unit of work.
///
/// Returns the image references of removed items so the caller can clean up
/// blobs after the commit.
pub(crate) async fn stage_wishlist_cascade(
    session: &mut dyn Session,
    mut wishlist: Wishlist,
) -> Result<Vec<String>, AppError> {
    let wishlist_id = wishlist.id();
    let mut blob_refs = Vec::new();

    for mut item in session.items_by_wishlist(&wishlist_id).await? {
        if let Some(image) = item.image() {
            blob_refs.push(image.to_string());
        }
        item.mark_deleted();
        session.remove_item(item).await?;
    }

    if let Some(link) = session.link_by_wishlist(&wishlist_id).await? {
        let link_id = link.id();
        for visit in session.visits_by_link(&link_id).await? {
            session.remove_visit(visit).await?;
        }
        session.remove_link(link).await?;
    }

    wishlist.mark_deleted();
    session.remove_wishlist(wishlist).await?;

    Ok(blob_refs)
}
