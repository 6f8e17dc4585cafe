//! Update wishlist command: rename and visibility.

use std::sync::Arc;

use async_trait::async_trait;
use common::{UserId, WishlistId};
use store::{Session, Store, WishlistRepository};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::dto::WishlistDto;
use crate::error::AppError;
use crate::validate::{FieldViolation, MAX_NAME_LENGTH, Violations};

/// Renames a wishlist and sets its public/private flag.
#[derive(Debug, Clone)]
pub struct UpdateWishlist {
    pub wishlist_id: WishlistId,
    pub user_id: UserId,
    pub name: String,
    pub public: bool,
}

impl RequestMeta for UpdateWishlist {
    fn name(&self) -> &'static str {
        "UpdateWishlist"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.require("name", &self.name);
        v.max_length("name", &self.name, MAX_NAME_LENGTH);
        v.into_vec()
    }
}

impl Request for UpdateWishlist {
    type Output = WishlistDto;
}

pub struct UpdateWishlistHandler {
    store: Arc<dyn Store>,
}

impl UpdateWishlistHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler<UpdateWishlist> for UpdateWishlistHandler {
    #[tracing::instrument(skip(self, ctx))]
    async fn handle(
        &self,
        request: UpdateWishlist,
        ctx: &RequestContext,
    ) -> Result<WishlistDto, AppError> {
        let mut session = self.store.begin();

        let mut wishlist = session
            .wishlist(&request.wishlist_id)
            .await?
            .ok_or_else(|| AppError::not_found("wishlist", request.wishlist_id))?;
        if !wishlist.is_owned_by(&request.user_id) {
            return Err(AppError::Forbidden("only the owner can update a wishlist"));
        }

        wishlist.rename(request.name)?;
        wishlist.set_visibility(request.public);
        let dto = WishlistDto::from(&wishlist);

        session.update_wishlist(wishlist).await?;
        ctx.ensure_active()?;
        session.commit().await?;

        Ok(dto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Wishlist;
    use store::MemoryStore;

    async fn seed(store: &MemoryStore, owner: &str, name: &str) -> WishlistId {
        let wishlist = Wishlist::new(owner.into(), name, false, 0).unwrap();
        let id = wishlist.id();
        let mut session = store.begin();
        session.add_wishlist(wishlist).await.unwrap();
        session.commit().await.unwrap();
        id
    }

    #[tokio::test]
    async fn owner_can_rename_and_publish() {
        let store = Arc::new(MemoryStore::new());
        let id = seed(&store, "owner-1", "Birthday").await;
        let handler = UpdateWishlistHandler::new(store.clone());

        let dto = handler
            .handle(
                UpdateWishlist {
                    wishlist_id: id,
                    user_id: "owner-1".into(),
                    name: "Big Birthday".into(),
                    public: true,
                },
                &RequestContext::new(),
            )
            .await
            .unwrap();

        assert_eq!(dto.name, "Big Birthday");
        assert!(dto.public);
    }

    #[tokio::test]
    async fn non_owner_is_forbidden_and_state_unchanged() {
        let store = Arc::new(MemoryStore::new());
        let id = seed(&store, "owner-1", "Birthday").await;
        let handler = UpdateWishlistHandler::new(store.clone());

        let result = handler
            .handle(
                UpdateWishlist {
                    wishlist_id: id,
                    user_id: "intruder".into(),
                    name: "Mine now".into(),
                    public: true,
                },
                &RequestContext::new(),
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        let session = store.begin();
        let wishlist = session.wishlist(&id).await.unwrap().unwrap();
        assert_eq!(wishlist.name(), "Birthday");
        assert!(!wishlist.is_public());
    }

    #[tokio::test]
    async fn missing_wishlist_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let handler = UpdateWishlistHandler::new(store);

        let result = handler
            .handle(
                UpdateWishlist {
                    wishlist_id: WishlistId::new(),
                    user_id: "owner-1".into(),
                    name: "X".into(),
                    public: false,
                },
                &RequestContext::new(),
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }
}
