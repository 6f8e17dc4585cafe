//! Create wishlist command.

use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use domain::Wishlist;
use store::{Session, Store, WishlistRepository};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::dto::WishlistDto;
use crate::error::AppError;
use crate::validate::{FieldViolation, MAX_NAME_LENGTH, Violations};

/// Creates a new wishlist for the caller.
///
/// The new list lands at the top of the caller's display order.
#[derive(Debug, Clone)]
pub struct CreateWishlist {
    pub user_id: UserId,
    pub name: String,
    pub public: bool,
}

impl RequestMeta for CreateWishlist {
    fn name(&self) -> &'static str {
        "CreateWishlist"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.require("name", &self.name);
        v.max_length("name", &self.name, MAX_NAME_LENGTH);
        v.into_vec()
    }
}

impl Request for CreateWishlist {
    type Output = WishlistDto;
}

pub struct CreateWishlistHandler {
    store: Arc<dyn Store>,
}

impl CreateWishlistHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler<CreateWishlist> for CreateWishlistHandler {
    #[tracing::instrument(skip(self, ctx))]
    async fn handle(
        &self,
        request: CreateWishlist,
        ctx: &RequestContext,
    ) -> Result<WishlistDto, AppError> {
        let mut session = self.store.begin();

        let order = session.wishlists_by_owner(&request.user_id).await?.len() as i32;
        let wishlist = Wishlist::new(request.user_id, request.name, request.public, order)?;
        let dto = WishlistDto::from(&wishlist);

        session.add_wishlist(wishlist).await?;
        ctx.ensure_active()?;
        session.commit().await?;

        Ok(dto)
    }
}
