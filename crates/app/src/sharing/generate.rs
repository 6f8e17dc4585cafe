//! Generate share link command.

use std::sync::Arc;

use async_trait::async_trait;
use common::{ShareCode, UserId, WishlistId};
use domain::SharedLink;
use store::{Session, ShareLinkRepository, Store, WishlistRepository};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::dto::ShareLinkDto;
use crate::error::AppError;
use crate::validate::{FieldViolation, Violations};

/// Returns the share link of a wishlist, creating it on first request.
///
/// Idempotent: the code is generated once per wishlist and every later call
/// returns the same one.
#[derive(Debug, Clone)]
pub struct GenerateShareLink {
    pub wishlist_id: WishlistId,
    pub user_id: UserId,
}

impl RequestMeta for GenerateShareLink {
    fn name(&self) -> &'static str {
        "GenerateShareLink"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.into_vec()
    }
}

impl Request for GenerateShareLink {
    type Output = ShareLinkDto;
}

pub struct GenerateShareLinkHandler {
    store: Arc<dyn Store>,
    code_length: usize,
}

impl GenerateShareLinkHandler {
    pub fn new(store: Arc<dyn Store>, code_length: usize) -> Self {
        Self { store, code_length }
    }
}

#[async_trait]
impl Handler<GenerateShareLink> for GenerateShareLinkHandler {
    #[tracing::instrument(skip(self, ctx))]
    async fn handle(
        &self,
        request: GenerateShareLink,
        ctx: &RequestContext,
    ) -> Result<ShareLinkDto, AppError> {
        let mut session = self.store.begin();

        let wishlist = session
            .wishlist(&request.wishlist_id)
            .await?
            .ok_or_else(|| AppError::not_found("wishlist", request.wishlist_id))?;
        if !wishlist.is_owned_by(&request.user_id) {
            return Err(AppError::Forbidden("only the owner can share a wishlist"));
        }

        if let Some(existing) = session.link_by_wishlist(&request.wishlist_id).await? {
            return Ok(ShareLinkDto::from(&existing));
        }

        let link = SharedLink::new(request.wishlist_id, ShareCode::generate(self.code_length));
        let dto = ShareLinkDto::from(&link);

        session.add_link(link).await?;
        ctx.ensure_active()?;
        session.commit().await?;

        Ok(dto)
    }
}
