//! List wishlists shared with the caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use store::{ShareLinkRepository, Store, UserRepository, VisitRepository, WishlistRepository};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::dto::{SharedOwnerGroupDto, SharedSummaryDto};
use crate::error::AppError;
use crate::validate::{FieldViolation, Violations};

/// Aggregates the caller's recorded visits into wishlists grouped by owner.
///
/// Visiting one's own share link does not count as "shared with me"; those
/// wishlists are filtered out.
#[derive(Debug, Clone)]
pub struct GetWishlistsSharedWithMe {
    pub user_id: UserId,
}

impl RequestMeta for GetWishlistsSharedWithMe {
    fn name(&self) -> &'static str {
        "GetWishlistsSharedWithMe"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.into_vec()
    }
}

impl Request for GetWishlistsSharedWithMe {
    type Output = Vec<SharedOwnerGroupDto>;
}

pub struct GetWishlistsSharedWithMeHandler {
    store: Arc<dyn Store>,
}

impl GetWishlistsSharedWithMeHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler<GetWishlistsSharedWithMe> for GetWishlistsSharedWithMeHandler {
    #[tracing::instrument(skip(self, _ctx))]
    async fn handle(
        &self,
        request: GetWishlistsSharedWithMe,
        _ctx: &RequestContext,
    ) -> Result<Vec<SharedOwnerGroupDto>, AppError> {
        let session = self.store.begin();

        let mut by_owner: BTreeMap<UserId, Vec<SharedSummaryDto>> = BTreeMap::new();
        for visit in session.visits_by_user(&request.user_id).await? {
            let Some(link) = session.link(&visit.link_id()).await? else {
                continue;
            };
            let Some(wishlist) = session.wishlist(&link.wishlist_id()).await? else {
                continue;
            };
            if wishlist.is_owned_by(&request.user_id) {
                continue;
            }

            by_owner
                .entry(wishlist.owner_id().clone())
                .or_default()
                .push(SharedSummaryDto {
                    wishlist_id: wishlist.id(),
                    name: wishlist.name().to_string(),
                    share_code: link.code().clone(),
                });
        }

        let mut groups = Vec::with_capacity(by_owner.len());
        for (owner_id, mut wishlists) in by_owner {
            let Some(owner) = session.user(&owner_id).await? else {
                continue;
            };
            wishlists.sort_by(|a, b| a.name.cmp(&b.name));
            groups.push(SharedOwnerGroupDto {
                owner_id,
                owner_name: owner.username().to_string(),
                wishlists,
            });
        }

        Ok(groups)
    }
}
