//! Wishlist aggregate root.

use chrono::{DateTime, Utc};
use common::{UserId, WishlistId};
use serde::{Deserialize, Serialize};

use crate::error::WishlistError;
use crate::event::{DomainEvent, EventSource};

/// A named collection of gift items belonging to one user.
///
/// The owner is fixed at creation. Display order is scoped to the owner:
/// higher values render first, and values are re-ranked dense after a
/// structural change (handled one level up, where sibling lists are
/// available).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wishlist {
    id: WishlistId,
    owner_id: UserId,
    name: String,
    public: bool,
    order: i32,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    pending: Vec<DomainEvent>,
}

impl Wishlist {
    /// Creates a new wishlist, raising a creation event.
    pub fn new(
        owner_id: UserId,
        name: impl Into<String>,
        public: bool,
        order: i32,
    ) -> Result<Self, WishlistError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(WishlistError::EmptyField("name"));
        }

        let mut wishlist = Self {
            id: WishlistId::new(),
            owner_id,
            name,
            public,
            order,
            created_at: Utc::now(),
            pending: Vec::new(),
        };
        wishlist.pending.push(DomainEvent::wishlist_created(
            wishlist.id,
            wishlist.owner_id.clone(),
            wishlist.name.clone(),
            wishlist.public,
        ));
        Ok(wishlist)
    }

    pub fn id(&self) -> WishlistId {
        self.id
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns true if the given user owns this wishlist.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }

    /// Renames the wishlist. A no-op rename raises no event.
    pub fn rename(&mut self, new_name: impl Into<String>) -> Result<(), WishlistError> {
        let new_name = new_name.into();
        if new_name.trim().is_empty() {
            return Err(WishlistError::EmptyField("name"));
        }
        if new_name == self.name {
            return Ok(());
        }

        let old_name = std::mem::replace(&mut self.name, new_name);
        self.pending.push(DomainEvent::wishlist_renamed(
            self.id,
            old_name,
            self.name.clone(),
        ));
        Ok(())
    }

    /// Changes the public/private flag. A no-op change raises no event.
    pub fn set_visibility(&mut self, public: bool) {
        if public == self.public {
            return;
        }
        self.public = public;
        self.pending
            .push(DomainEvent::wishlist_visibility_changed(self.id, public));
    }

    /// Assigns a new display order. A no-op change raises no event.
    pub fn reorder(&mut self, new_order: i32) {
        if new_order == self.order {
            return;
        }
        let old_order = std::mem::replace(&mut self.order, new_order);
        self.pending
            .push(DomainEvent::wishlist_reordered(self.id, old_order, new_order));
    }

    /// Raises the deletion event. Physical removal happens in the repository.
    pub fn mark_deleted(&mut self) {
        self.pending.push(DomainEvent::wishlist_deleted(
            self.id,
            self.owner_id.clone(),
        ));
    }
}

impl EventSource for Wishlist {
    fn pending_events(&self) -> &[DomainEvent] {
        &self.pending
    }

    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.pending)
    }
}
