//! Reorder wishlist items command.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{ItemId, UserId, WishlistId};
use store::{ItemRepository, Session, Store, WishlistRepository};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::dto::ItemDto;
use crate::error::AppError;
use crate::items::sort_for_display;
use crate::validate::{FieldViolation, Violations};

/// Reassigns display orders across all items of a wishlist.
///
/// All-or-nothing: the submitted ids must match the wishlist's item set
/// exactly, or nothing changes. Earlier entries end up higher in the display
/// (`order = count - 1 - index`).
#[derive(Debug, Clone)]
pub struct ReorderWishlistItems {
    pub wishlist_id: WishlistId,
    pub user_id: UserId,
    pub ordered_ids: Vec<ItemId>,
}

impl RequestMeta for ReorderWishlistItems {
    fn name(&self) -> &'static str {
        "ReorderWishlistItems"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.into_vec()
    }
}

impl Request for ReorderWishlistItems {
    type Output = Vec<ItemDto>;
}

pub struct ReorderWishlistItemsHandler {
    store: Arc<dyn Store>,
}

impl ReorderWishlistItemsHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler<ReorderWishlistItems> for ReorderWishlistItemsHandler {
    #[tracing::instrument(skip(self, ctx))]
    async fn handle(
        &self,
        request: ReorderWishlistItems,
        ctx: &RequestContext,
    ) -> Result<Vec<ItemDto>, AppError> {
        let mut session = self.store.begin();

        let wishlist = session
            .wishlist(&request.wishlist_id)
            .await?
            .ok_or_else(|| AppError::not_found("wishlist", request.wishlist_id))?;
        if !wishlist.is_owned_by(&request.user_id) {
            return Err(AppError::Forbidden("only the owner can reorder items"));
        }

        let mut items = session.items_by_wishlist(&request.wishlist_id).await?;
        if request.ordered_ids.len() != items.len() {
            return Err(AppError::bad_request(
                "ordered ids must cover the wishlist's items exactly",
            ));
        }

        let positions: HashMap<ItemId, usize> = request
            .ordered_ids
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, index))
            .collect();
        if positions.len() != request.ordered_ids.len() {
            return Err(AppError::bad_request("ordered ids contain duplicates"));
        }

        let count = items.len() as i32;
        for item in &mut items {
            match positions.get(&item.id()) {
                Some(index) => item.reorder(count - 1 - *index as i32),
                None => {
                    return Err(AppError::bad_request(
                        "ordered ids must cover the wishlist's items exactly",
                    ));
                }
            }
        }

        sort_for_display(&mut items);
        let dtos: Vec<ItemDto> = items.iter().map(ItemDto::from).collect();

        for item in items {
            session.update_item(item).await?;
        }
        ctx.ensure_active()?;
        session.commit().await?;

        Ok(dtos)
    }
}
