//! Update user profile command.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::UserId;
use store::{Session, Store, UserRepository};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::dto::UserDto;
use crate::error::AppError;
use crate::ports::{BlobStore, ImageUpload};
use crate::validate::{FieldViolation, MAX_BIO_LENGTH, Violations};

/// Updates the caller's bio, birth date, and optionally the avatar.
#[derive(Debug, Clone)]
pub struct UpdateUserProfile {
    pub user_id: UserId,
    pub bio: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar: Option<ImageUpload>,
}

impl RequestMeta for UpdateUserProfile {
    fn name(&self) -> &'static str {
        "UpdateUserProfile"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        if let Some(bio) = &self.bio {
            v.max_length("bio", bio, MAX_BIO_LENGTH);
        }
        if let Some(avatar) = &self.avatar {
            v.require("avatar.filename", &avatar.filename);
            if avatar.bytes.is_empty() {
                v.add("avatar.bytes", "must not be empty");
            }
        }
        v.into_vec()
    }
}

impl Request for UpdateUserProfile {
    type Output = UserDto;
}

pub struct UpdateUserProfileHandler {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
}

impl UpdateUserProfileHandler {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }
}

#[async_trait]
impl Handler<UpdateUserProfile> for UpdateUserProfileHandler {
    #[tracing::instrument(skip(self, request, ctx), fields(user_id = %request.user_id))]
    async fn handle(
        &self,
        request: UpdateUserProfile,
        ctx: &RequestContext,
    ) -> Result<UserDto, AppError> {
        let mut session = self.store.begin();

        let mut user = session
            .user(&request.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user", &request.user_id))?;

        user.update_profile(request.bio, request.date_of_birth);

        let stale_avatar = match request.avatar {
            Some(upload) => {
                let previous = user.avatar().map(str::to_string);
                let reference = self.blobs.put(&upload.filename, upload.bytes).await?;
                user.set_avatar(Some(reference));
                previous
            }
            None => None,
        };

        let dto = UserDto::from(&user);
        session.update_user(user).await?;
        ctx.ensure_active()?;
        session.commit().await?;

        if let Some(reference) = stale_avatar
            && let Err(err) = self.blobs.delete(&reference).await
        {
            tracing::warn!(reference = %reference, error = %err, "failed to delete stale avatar blob");
        }

        Ok(dto)
    }
}
