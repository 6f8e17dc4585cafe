//! Create wishlist item command.

use std::sync::Arc;

use async_trait::async_trait;
use common::{UserId, WishlistId};
use domain::WishlistItem;
use store::{ItemRepository, Session, Store, WishlistRepository};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::dto::ItemDto;
use crate::error::AppError;
use crate::validate::{FieldViolation, MAX_NAME_LENGTH, Violations};

/// Adds an item to a wishlist the caller owns.
///
/// The item starts unreserved, at the top of the display order.
#[derive(Debug, Clone)]
pub struct CreateWishlistItem {
    pub wishlist_id: WishlistId,
    pub user_id: UserId,
    pub name: String,
    pub link: Option<String>,
}

impl RequestMeta for CreateWishlistItem {
    fn name(&self) -> &'static str {
        "CreateWishlistItem"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.require("name", &self.name);
        v.max_length("name", &self.name, MAX_NAME_LENGTH);
        v.link("link", self.link.as_deref());
        v.into_vec()
    }
}

impl Request for CreateWishlistItem {
    type Output = ItemDto;
}

pub struct CreateWishlistItemHandler {
    store: Arc<dyn Store>,
}

impl CreateWishlistItemHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler<CreateWishlistItem> for CreateWishlistItemHandler {
    #[tracing::instrument(skip(self, ctx))]
    async fn handle(
        &self,
        request: CreateWishlistItem,
        ctx: &RequestContext,
    ) -> Result<ItemDto, AppError> {
        let mut session = self.store.begin();

        let wishlist = session
            .wishlist(&request.wishlist_id)
            .await?
            .ok_or_else(|| AppError::not_found("wishlist", request.wishlist_id))?;
        if !wishlist.is_owned_by(&request.user_id) {
            return Err(AppError::Forbidden("only the owner can add items"));
        }

        let order = session.items_by_wishlist(&request.wishlist_id).await?.len() as i32;
        let item = WishlistItem::new(request.wishlist_id, request.name, request.link, order)?;
        let dto = ItemDto::from(&item);

        session.add_item(item).await?;
        ctx.ensure_active()?;
        session.commit().await?;

        Ok(dto)
    }
}
