//! Delete wishlist command.

use std::sync::Arc;

use async_trait::async_trait;
use common::{UserId, WishlistId};
use store::{Session, Store, WishlistRepository};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::error::AppError;
use crate::ports::BlobStore;
use crate::validate::{FieldViolation, Violations};
use crate::wishlists::{rerank_by_recency, stage_wishlist_cascade};

/// Deletes a wishlist with its items, share link, and visit records.
///
/// The caller's remaining wishlists are re-ranked dense in the same unit of
/// work; item image blobs are cleaned up after the commit.
#[derive(Debug, Clone)]
pub struct DeleteWishlist {
    pub wishlist_id: WishlistId,
    pub user_id: UserId,
}

impl RequestMeta for DeleteWishlist {
    fn name(&self) -> &'static str {
        "DeleteWishlist"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.into_vec()
    }
}

impl Request for DeleteWishlist {
    type Output = ();
}

pub struct DeleteWishlistHandler {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
}

impl DeleteWishlistHandler {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }
}

#[async_trait]
impl Handler<DeleteWishlist> for DeleteWishlistHandler {
    #[tracing::instrument(skip(self, ctx))]
    async fn handle(&self, request: DeleteWishlist, ctx: &RequestContext) -> Result<(), AppError> {
        let mut session = self.store.begin();

        let wishlist = session
            .wishlist(&request.wishlist_id)
            .await?
            .ok_or_else(|| AppError::not_found("wishlist", request.wishlist_id))?;
        if !wishlist.is_owned_by(&request.user_id) {
            return Err(AppError::Forbidden("only the owner can delete a wishlist"));
        }

        let blob_refs = stage_wishlist_cascade(session.as_mut(), wishlist).await?;

        let mut remaining: Vec<_> = session
            .wishlists_by_owner(&request.user_id)
            .await?
            .into_iter()
            .filter(|w| w.id() != request.wishlist_id)
            .collect();
        rerank_by_recency(&mut remaining);
        for wishlist in remaining {
            session.update_wishlist(wishlist).await?;
        }

        ctx.ensure_active()?;
        session.commit().await?;

        for reference in blob_refs {
            if let Err(err) = self.blobs.delete(&reference).await {
                tracing::warn!(reference = %reference, error = %err, "failed to delete item image blob");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MemoryBlobStore;
    use common::ShareCode;
    use domain::{SharedLink, SharedLinkVisit, Wishlist, WishlistItem};
    use store::{ItemRepository, MemoryStore, ShareLinkRepository, VisitRepository};

    #[tokio::test]
    async fn cascade_removes_items_link_and_visits() {
        let store = Arc::new(MemoryStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());

        let wishlist = Wishlist::new("owner-1".into(), "Birthday", false, 0).unwrap();
        let wishlist_id = wishlist.id();
        let item = WishlistItem::new(wishlist_id, "Book", None, 0).unwrap();
        let link = SharedLink::new(wishlist_id, ShareCode::generate(16));
        let visit = SharedLinkVisit::new(link.id(), "visitor-1".into());

        let mut session = store.begin();
        session.add_wishlist(wishlist).await.unwrap();
        session.add_item(item).await.unwrap();
        session.add_link(link).await.unwrap();
        session.add_visit(visit).await.unwrap();
        session.commit().await.unwrap();

        let handler = DeleteWishlistHandler::new(store.clone(), blobs);
        handler
            .handle(
                DeleteWishlist {
                    wishlist_id,
                    user_id: "owner-1".into(),
                },
                &RequestContext::new(),
            )
            .await
            .unwrap();

        assert_eq!(store.wishlist_count().await, 0);
        assert_eq!(store.item_count().await, 0);
        assert_eq!(store.visit_count().await, 0);
    }

    #[tokio::test]
    async fn non_owner_cannot_delete() {
        let store = Arc::new(MemoryStore::new());
        let wishlist = Wishlist::new("owner-1".into(), "Birthday", false, 0).unwrap();
        let wishlist_id = wishlist.id();

        let mut session = store.begin();
        session.add_wishlist(wishlist).await.unwrap();
        session.commit().await.unwrap();

        let handler = DeleteWishlistHandler::new(store.clone(), Arc::new(MemoryBlobStore::new()));
        let result = handler
            .handle(
                DeleteWishlist {
                    wishlist_id,
                    user_id: "intruder".into(),
                },
                &RequestContext::new(),
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(store.wishlist_count().await, 1);
    }

    #[tokio::test]
    async fn survivors_are_reranked_dense() {
        let store = Arc::new(MemoryStore::new());
        let mut ids = Vec::new();
        let mut session = store.begin();
        for (index, name) in ["A", "B", "C"].iter().enumerate() {
            let wishlist = Wishlist::new("owner-1".into(), *name, false, index as i32).unwrap();
            ids.push(wishlist.id());
            session.add_wishlist(wishlist).await.unwrap();
        }
        session.commit().await.unwrap();

        let handler = DeleteWishlistHandler::new(store.clone(), Arc::new(MemoryBlobStore::new()));
        handler
            .handle(
                DeleteWishlist {
                    wishlist_id: ids[0],
                    user_id: "owner-1".into(),
                },
                &RequestContext::new(),
            )
            .await
            .unwrap();

        let session = store.begin();
        let mut orders: Vec<i32> = Vec::new();
        for id in &ids[1..] {
            orders.push(session.wishlist(id).await.unwrap().unwrap().order());
        }
        orders.sort_unstable();
        assert_eq!(orders, vec![0, 1]);
    }
}
