//! Reorder wishlists command.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{UserId, WishlistId};
use store::{Session, Store, WishlistRepository};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::dto::WishlistDto;
use crate::error::AppError;
use crate::validate::{FieldViolation, Violations};
use crate::wishlists::sort_for_display;

/// Reassigns display orders across all of the caller's wishlists.
///
/// All-or-nothing: the submitted ids must be exactly the caller's wishlist
/// set. Earlier entries end up higher in the display (`order = count - 1 -
/// index`).
#[derive(Debug, Clone)]
pub struct ReorderWishlists {
    pub user_id: UserId,
    pub ordered_ids: Vec<WishlistId>,
}

impl RequestMeta for ReorderWishlists {
    fn name(&self) -> &'static str {
        "ReorderWishlists"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.into_vec()
    }
}

impl Request for ReorderWishlists {
    type Output = Vec<WishlistDto>;
}

pub struct ReorderWishlistsHandler {
    store: Arc<dyn Store>,
}

impl ReorderWishlistsHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler<ReorderWishlists> for ReorderWishlistsHandler {
    #[tracing::instrument(skip(self, ctx))]
    async fn handle(
        &self,
        request: ReorderWishlists,
        ctx: &RequestContext,
    ) -> Result<Vec<WishlistDto>, AppError> {
        let mut session = self.store.begin();

        let mut wishlists = session.wishlists_by_owner(&request.user_id).await?;
        if request.ordered_ids.len() != wishlists.len() {
            return Err(AppError::bad_request(
                "ordered ids must cover the caller's wishlists exactly",
            ));
        }

        let positions: HashMap<WishlistId, usize> = request
            .ordered_ids
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, index))
            .collect();
        if positions.len() != request.ordered_ids.len() {
            return Err(AppError::bad_request("ordered ids contain duplicates"));
        }

        let count = wishlists.len() as i32;
        for wishlist in &mut wishlists {
            match positions.get(&wishlist.id()) {
                Some(index) => wishlist.reorder(count - 1 - *index as i32),
                None => {
                    return Err(AppError::bad_request(
                        "ordered ids must cover the caller's wishlists exactly",
                    ));
                }
            }
        }

        sort_for_display(&mut wishlists);
        let dtos: Vec<WishlistDto> = wishlists.iter().map(WishlistDto::from).collect();

        for wishlist in wishlists {
            session.update_wishlist(wishlist).await?;
        }
        ctx.ensure_active()?;
        session.commit().await?;

        Ok(dtos)
    }
}
