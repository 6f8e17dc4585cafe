//! User entity.

use chrono::{DateTime, NaiveDate, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};

use crate::error::WishlistError;
use crate::event::{DomainEvent, EventSource};

/// A registered user.
///
/// The ID comes from the external identity provider and is never generated
/// here. Username and email uniqueness spans all users and is enforced by
/// the storage layer's constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    bio: Option<String>,
    avatar: Option<String>,
    date_of_birth: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    pending: Vec<DomainEvent>,
}

impl User {
    /// Creates a user record from identity provider claims.
    pub fn register(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        date_of_birth: Option<NaiveDate>,
    ) -> Result<Self, WishlistError> {
        let username = username.into();
        let email = email.into();
        if username.trim().is_empty() {
            return Err(WishlistError::EmptyField("username"));
        }
        if email.trim().is_empty() {
            return Err(WishlistError::EmptyField("email"));
        }

        let mut user = Self {
            id,
            username,
            email,
            bio: None,
            avatar: None,
            date_of_birth,
            created_at: Utc::now(),
            pending: Vec::new(),
        };
        user.pending.push(DomainEvent::user_registered(
            user.id.clone(),
            user.username.clone(),
        ));
        Ok(user)
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replaces bio and date of birth. No event when nothing changed.
    pub fn update_profile(&mut self, bio: Option<String>, date_of_birth: Option<NaiveDate>) {
        if bio == self.bio && date_of_birth == self.date_of_birth {
            return;
        }
        self.bio = bio;
        self.date_of_birth = date_of_birth;
        self.pending
            .push(DomainEvent::user_profile_updated(self.id.clone()));
    }

    /// Replaces the avatar reference. No event when unchanged.
    pub fn set_avatar(&mut self, avatar: Option<String>) {
        if avatar == self.avatar {
            return;
        }
        self.avatar = avatar;
        self.pending
            .push(DomainEvent::user_profile_updated(self.id.clone()));
    }

    /// Raises the deletion event. Physical removal happens in the repository.
    pub fn mark_deleted(&mut self) {
        self.pending.push(DomainEvent::user_deleted(self.id.clone()));
    }
}

impl EventSource for User {
    fn pending_events(&self) -> &[DomainEvent] {
        &self.pending
    }

    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.pending)
    }
}
