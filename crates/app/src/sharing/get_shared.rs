//! Fetch a wishlist through its share code.

use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use domain::SharedLinkVisit;
use store::{
    ItemRepository, Session, ShareLinkRepository, Store, UserRepository, VisitRepository,
    WishlistRepository,
};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::dto::{SharedItemDto, SharedWishlistDto};
use crate::error::AppError;
use crate::items::sort_for_display;
use crate::validate::{FieldViolation, Violations};

/// Resolves a share code to the wishlist behind it.
///
/// The first authenticated non-owner access records a visit, deduplicated
/// per (link, user). The projection reveals reservation flags but never who
/// else holds one.
#[derive(Debug, Clone)]
pub struct GetSharedWishlist {
    pub share_code: String,
    pub current_user_id: Option<UserId>,
}

impl RequestMeta for GetSharedWishlist {
    fn name(&self) -> &'static str {
        "GetSharedWishlist"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("shareCode", &self.share_code);
        v.into_vec()
    }
}

impl Request for GetSharedWishlist {
    type Output = SharedWishlistDto;
}

pub struct GetSharedWishlistHandler {
    store: Arc<dyn Store>,
}

impl GetSharedWishlistHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler<GetSharedWishlist> for GetSharedWishlistHandler {
    #[tracing::instrument(skip(self, request, ctx), fields(code = %request.share_code))]
    async fn handle(
        &self,
        request: GetSharedWishlist,
        ctx: &RequestContext,
    ) -> Result<SharedWishlistDto, AppError> {
        let mut session = self.store.begin();

        let link = session
            .link_by_code(&request.share_code)
            .await?
            .ok_or_else(|| AppError::not_found("share link", &request.share_code))?;
        let wishlist = session
            .wishlist(&link.wishlist_id())
            .await?
            .ok_or_else(|| AppError::not_found("wishlist", link.wishlist_id()))?;
        let owner = session
            .user(wishlist.owner_id())
            .await?
            .ok_or_else(|| AppError::not_found("user", wishlist.owner_id()))?;

        if let Some(viewer) = &request.current_user_id
            && !wishlist.is_owned_by(viewer)
            && session.visit(&link.id(), viewer).await?.is_none()
        {
            session
                .add_visit(SharedLinkVisit::new(link.id(), viewer.clone()))
                .await?;
            ctx.ensure_active()?;
            session.commit().await?;
        }

        let mut items = session.items_by_wishlist(&wishlist.id()).await?;
        sort_for_display(&mut items);

        Ok(SharedWishlistDto {
            id: wishlist.id(),
            name: wishlist.name().to_string(),
            owner_id: wishlist.owner_id().clone(),
            owner_name: owner.username().to_string(),
            items: items
                .iter()
                .map(|item| SharedItemDto::project(item, request.current_user_id.as_ref()))
                .collect(),
        })
    }
}
