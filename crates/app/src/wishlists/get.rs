//! Fetch one wishlist with its items, owner view.

use std::sync::Arc;

use async_trait::async_trait;
use common::{UserId, WishlistId};
use store::{ItemRepository, Store, WishlistRepository};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::dto::{ItemDto, WishlistDetailsDto};
use crate::error::AppError;
use crate::validate::{FieldViolation, Violations};

/// Returns a wishlist with its items for the owner.
///
/// The projection carries no reservation state: what visitors reserved stays
/// hidden from the list owner.
#[derive(Debug, Clone)]
pub struct GetWishlist {
    pub wishlist_id: WishlistId,
    pub user_id: UserId,
}

impl RequestMeta for GetWishlist {
    fn name(&self) -> &'static str {
        "GetWishlist"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.into_vec()
    }
}

impl Request for GetWishlist {
    type Output = WishlistDetailsDto;
}

pub struct GetWishlistHandler {
    store: Arc<dyn Store>,
}

impl GetWishlistHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler<GetWishlist> for GetWishlistHandler {
    #[tracing::instrument(skip(self, _ctx))]
    async fn handle(
        &self,
        request: GetWishlist,
        _ctx: &RequestContext,
    ) -> Result<WishlistDetailsDto, AppError> {
        let session = self.store.begin();

        let wishlist = session
            .wishlist(&request.wishlist_id)
            .await?
            .ok_or_else(|| AppError::not_found("wishlist", request.wishlist_id))?;
        if !wishlist.is_owned_by(&request.user_id) {
            return Err(AppError::Forbidden("only the owner can view this wishlist"));
        }

        let mut items = session.items_by_wishlist(&request.wishlist_id).await?;
        crate::items::sort_for_display(&mut items);

        Ok(WishlistDetailsDto {
            id: wishlist.id(),
            name: wishlist.name().to_string(),
            public: wishlist.is_public(),
            order: wishlist.order(),
            items: items.iter().map(ItemDto::from).collect(),
        })
    }
}
