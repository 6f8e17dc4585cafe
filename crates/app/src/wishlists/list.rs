//! List the caller's wishlists.

use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use store::{Store, WishlistRepository};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::dto::WishlistDto;
use crate::error::AppError;
use crate::validate::{FieldViolation, Violations};
use crate::wishlists::sort_for_display;

/// Returns all wishlists owned by the caller, display order first.
#[derive(Debug, Clone)]
pub struct GetWishlists {
    pub user_id: UserId,
}

impl RequestMeta for GetWishlists {
    fn name(&self) -> &'static str {
        "GetWishlists"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.into_vec()
    }
}

impl Request for GetWishlists {
    type Output = Vec<WishlistDto>;
}

pub struct GetWishlistsHandler {
    store: Arc<dyn Store>,
}

impl GetWishlistsHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler<GetWishlists> for GetWishlistsHandler {
    #[tracing::instrument(skip(self, _ctx))]
    async fn handle(
        &self,
        request: GetWishlists,
        _ctx: &RequestContext,
    ) -> Result<Vec<WishlistDto>, AppError> {
        let session = self.store.begin();
        let mut wishlists = session.wishlists_by_owner(&request.user_id).await?;
        sort_for_display(&mut wishlists);
        Ok(wishlists.iter().map(WishlistDto::from).collect())
    }
}
