//! Fetch the caller's profile.

use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use store::{Store, UserRepository};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::dto::UserDto;
use crate::error::AppError;
use crate::validate::{FieldViolation, Violations};

/// Returns the caller's own profile.
#[derive(Debug, Clone)]
pub struct GetUserProfile {
    pub user_id: UserId,
}

impl RequestMeta for GetUserProfile {
    fn name(&self) -> &'static str {
        "GetUserProfile"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.into_vec()
    }
}

impl Request for GetUserProfile {
    type Output = UserDto;
}

pub struct GetUserProfileHandler {
    store: Arc<dyn Store>,
}

impl GetUserProfileHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler<GetUserProfile> for GetUserProfileHandler {
    #[tracing::instrument(skip(self, _ctx))]
    async fn handle(
        &self,
        request: GetUserProfile,
        _ctx: &RequestContext,
    ) -> Result<UserDto, AppError> {
        let session = self.store.begin();
        let user = session
            .user(&request.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user", &request.user_id))?;
        Ok(UserDto::from(&user))
    }
}
