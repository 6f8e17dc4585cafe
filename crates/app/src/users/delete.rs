//! Delete user command.

use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use store::{Session, Store, UserRepository, WishlistRepository};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::error::AppError;
use crate::ports::BlobStore;
use crate::validate::{FieldViolation, Violations};
use crate::wishlists::stage_wishlist_cascade;

/// Deletes the caller's account and everything they own.
///
/// Wishlists cascade to items, share links, and visit records, all in one
/// unit of work. Blobs (item images, avatar) are cleaned up after commit.
#[derive(Debug, Clone)]
pub struct DeleteUser {
    pub user_id: UserId,
}

impl RequestMeta for DeleteUser {
    fn name(&self) -> &'static str {
        "DeleteUser"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.into_vec()
    }
}

impl Request for DeleteUser {
    type Output = ();
}

pub struct DeleteUserHandler {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
}

impl DeleteUserHandler {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }
}

#[async_trait]
impl Handler<DeleteUser> for DeleteUserHandler {
    #[tracing::instrument(skip(self, ctx))]
    async fn handle(&self, request: DeleteUser, ctx: &RequestContext) -> Result<(), AppError> {
        let mut session = self.store.begin();

        let mut user = session
            .user(&request.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user", &request.user_id))?;

        let mut blob_refs = Vec::new();
        if let Some(avatar) = user.avatar() {
            blob_refs.push(avatar.to_string());
        }

        for wishlist in session.wishlists_by_owner(&request.user_id).await? {
            let mut refs = stage_wishlist_cascade(session.as_mut(), wishlist).await?;
            blob_refs.append(&mut refs);
        }

        user.mark_deleted();
        session.remove_user(user).await?;

        ctx.ensure_active()?;
        session.commit().await?;

        for reference in blob_refs {
            if let Err(err) = self.blobs.delete(&reference).await {
                tracing::warn!(reference = %reference, error = %err, "failed to delete blob");
            }
        }

        Ok(())
    }
}
