//! Delete wishlist item command.

use std::sync::Arc;

use async_trait::async_trait;
use common::{ItemId, UserId, WishlistId};
use store::{ItemRepository, Session, Store};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::error::AppError;
use crate::items::{load_item_in_wishlist, rerank_by_recency};
use crate::ports::BlobStore;
use crate::validate::{FieldViolation, Violations};

/// Removes an item and re-ranks its surviving siblings dense zero-based.
#[derive(Debug, Clone)]
pub struct DeleteWishlistItem {
    pub item_id: ItemId,
    pub wishlist_id: WishlistId,
    pub user_id: UserId,
}

impl RequestMeta for DeleteWishlistItem {
    fn name(&self) -> &'static str {
        "DeleteWishlistItem"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.into_vec()
    }
}

impl Request for DeleteWishlistItem {
    type Output = ();
}

pub struct DeleteWishlistItemHandler {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
}

impl DeleteWishlistItemHandler {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }
}

#[async_trait]
impl Handler<DeleteWishlistItem> for DeleteWishlistItemHandler {
    #[tracing::instrument(skip(self, ctx))]
    async fn handle(
        &self,
        request: DeleteWishlistItem,
        ctx: &RequestContext,
    ) -> Result<(), AppError> {
        let mut session = self.store.begin();

        let (mut item, wishlist) =
            load_item_in_wishlist(session.as_ref(), &request.item_id, &request.wishlist_id).await?;
        if !wishlist.is_owned_by(&request.user_id) {
            return Err(AppError::Forbidden("only the owner can delete items"));
        }

        let image = item.image().map(str::to_string);
        item.mark_deleted();
        session.remove_item(item).await?;

        let mut survivors: Vec<_> = session
            .items_by_wishlist(&request.wishlist_id)
            .await?
            .into_iter()
            .filter(|i| i.id() != request.item_id)
            .collect();
        rerank_by_recency(&mut survivors);
        for survivor in survivors {
            session.update_item(survivor).await?;
        }

        ctx.ensure_active()?;
        session.commit().await?;

        if let Some(reference) = image
            && let Err(err) = self.blobs.delete(&reference).await
        {
            tracing::warn!(reference = %reference, error = %err, "failed to delete item image blob");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MemoryBlobStore;
    use domain::{Wishlist, WishlistItem};
    use store::{MemoryStore, WishlistRepository};

    async fn seed_items(store: &MemoryStore, count: usize) -> (WishlistId, Vec<ItemId>) {
        let wishlist = Wishlist::new("owner-1".into(), "Birthday", false, 0).unwrap();
        let wishlist_id = wishlist.id();
        let mut ids = Vec::new();
        let mut session = store.begin();
        session.add_wishlist(wishlist).await.unwrap();
        for index in 0..count {
            let item =
                WishlistItem::new(wishlist_id, format!("item-{index}"), None, index as i32)
                    .unwrap();
            ids.push(item.id());
            session.add_item(item).await.unwrap();
        }
        session.commit().await.unwrap();
        (wishlist_id, ids)
    }

    #[tokio::test]
    async fn survivors_are_reranked_without_gaps() {
        let store = Arc::new(MemoryStore::new());
        let (wishlist_id, ids) = seed_items(&store, 3).await;
        let handler =
            DeleteWishlistItemHandler::new(store.clone(), Arc::new(MemoryBlobStore::new()));

        handler
            .handle(
                DeleteWishlistItem {
                    item_id: ids[0],
                    wishlist_id,
                    user_id: "owner-1".into(),
                },
                &RequestContext::new(),
            )
            .await
            .unwrap();

        let session = store.begin();
        let mut orders: Vec<i32> = session
            .items_by_wishlist(&wishlist_id)
            .await
            .unwrap()
            .iter()
            .map(|i| i.order())
            .collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![0, 1]);
    }

    #[tokio::test]
    async fn non_owner_cannot_delete() {
        let store = Arc::new(MemoryStore::new());
        let (wishlist_id, ids) = seed_items(&store, 1).await;
        let handler =
            DeleteWishlistItemHandler::new(store.clone(), Arc::new(MemoryBlobStore::new()));

        let result = handler
            .handle(
                DeleteWishlistItem {
                    item_id: ids[0],
                    wishlist_id,
                    user_id: "intruder".into(),
                },
                &RequestContext::new(),
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(store.item_count().await, 1);
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let (wishlist_id, _) = seed_items(&store, 1).await;
        let handler = DeleteWishlistItemHandler::new(store, Arc::new(MemoryBlobStore::new()));

        let result = handler
            .handle(
                DeleteWishlistItem {
                    item_id: ItemId::new(),
                    wishlist_id,
                    user_id: "owner-1".into(),
                },
                &RequestContext::new(),
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }
}
