//! Register user command.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::UserId;
use domain::User;
use store::{Session, Store, UserRepository};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::dto::UserDto;
use crate::error::AppError;
use crate::validate::{FieldViolation, MAX_USERNAME_LENGTH, Violations};

/// Creates the local user record for an externally verified identity.
///
/// The ID is the identity provider's subject; username and email must be
/// unique across all users.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
}

impl RequestMeta for RegisterUser {
    fn name(&self) -> &'static str {
        "RegisterUser"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.require("username", &self.username);
        v.max_length("username", &self.username, MAX_USERNAME_LENGTH);
        v.email("email", &self.email);
        v.into_vec()
    }
}

impl Request for RegisterUser {
    type Output = UserDto;
}

pub struct RegisterUserHandler {
    store: Arc<dyn Store>,
}

impl RegisterUserHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler<RegisterUser> for RegisterUserHandler {
    #[tracing::instrument(skip(self, ctx))]
    async fn handle(&self, request: RegisterUser, ctx: &RequestContext) -> Result<UserDto, AppError> {
        let mut session = self.store.begin();

        if session.user(&request.user_id).await?.is_some() {
            return Err(AppError::conflict("user already registered"));
        }
        if session.user_by_username(&request.username).await?.is_some() {
            return Err(AppError::conflict("username already taken"));
        }
        if session.user_by_email(&request.email).await?.is_some() {
            return Err(AppError::conflict("email already registered"));
        }

        let user = User::register(
            request.user_id,
            request.username,
            request.email,
            request.date_of_birth,
        )?;
        let dto = UserDto::from(&user);

        session.add_user(user).await?;
        ctx.ensure_active()?;
        session.commit().await?;

        Ok(dto)
    }
}
