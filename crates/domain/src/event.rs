//! Domain events raised by entity mutations.

use chrono::{DateTime, Utc};
use common::{ItemId, ShareCode, ShareLinkId, UserId, VisitId, WishlistId};
use serde::{Deserialize, Serialize};

/// Trait for entities that queue domain events.
///
/// Mutating operations append events to an in-memory pending list on the
/// entity instance. The unit of work drains the list when the entity is
/// staged for persistence; entities never publish events themselves.
pub trait EventSource {
    /// Returns the events raised since the last drain.
    fn pending_events(&self) -> &[DomainEvent];

    /// Drains and returns the pending events, leaving the list empty.
    fn take_events(&mut self) -> Vec<DomainEvent>;
}

/// Events describing state transitions in the wishlist domain.
///
/// Events are facts named in past tense. They are published through the
/// [`crate::EventChannel`] only after the unit of work that produced them
/// has committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DomainEvent {
    /// A user record was created from identity provider claims.
    UserRegistered(UserRegisteredData),

    /// A user's profile fields changed.
    UserProfileUpdated(UserProfileUpdatedData),

    /// A user was deleted along with everything they owned.
    UserDeleted(UserDeletedData),

    /// A wishlist was created.
    WishlistCreated(WishlistCreatedData),

    /// A wishlist was renamed.
    WishlistRenamed(WishlistRenamedData),

    /// A wishlist's public/private flag changed.
    WishlistVisibilityChanged(WishlistVisibilityChangedData),

    /// A wishlist's display order changed.
    WishlistReordered(WishlistReorderedData),

    /// A wishlist was deleted.
    WishlistDeleted(WishlistDeletedData),

    /// An item was added to a wishlist.
    ItemAdded(ItemAddedData),

    /// An item's details changed.
    ItemUpdated(ItemUpdatedData),

    /// An item's display order changed.
    ItemReordered(ItemReorderedData),

    /// An item was removed from a wishlist.
    ItemRemoved(ItemRemovedData),

    /// An item's reservation was set or cleared.
    ReservationToggled(ReservationToggledData),

    /// A share link was created for a wishlist.
    ShareLinkCreated(ShareLinkCreatedData),

    /// A user visited a share link for the first time.
    LinkVisited(LinkVisitedData),
}

impl DomainEvent {
    /// Returns the event type name, used for logging and filtering.
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::UserRegistered(_) => "UserRegistered",
            DomainEvent::UserProfileUpdated(_) => "UserProfileUpdated",
            DomainEvent::UserDeleted(_) => "UserDeleted",
            DomainEvent::WishlistCreated(_) => "WishlistCreated",
            DomainEvent::WishlistRenamed(_) => "WishlistRenamed",
            DomainEvent::WishlistVisibilityChanged(_) => "WishlistVisibilityChanged",
            DomainEvent::WishlistReordered(_) => "WishlistReordered",
            DomainEvent::WishlistDeleted(_) => "WishlistDeleted",
            DomainEvent::ItemAdded(_) => "ItemAdded",
            DomainEvent::ItemUpdated(_) => "ItemUpdated",
            DomainEvent::ItemReordered(_) => "ItemReordered",
            DomainEvent::ItemRemoved(_) => "ItemRemoved",
            DomainEvent::ReservationToggled(_) => "ReservationToggled",
            DomainEvent::ShareLinkCreated(_) => "ShareLinkCreated",
            DomainEvent::LinkVisited(_) => "LinkVisited",
        }
    }
}

/// Data for UserRegistered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegisteredData {
    pub user_id: UserId,
    pub username: String,
    pub registered_at: DateTime<Utc>,
}

/// Data for UserProfileUpdated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileUpdatedData {
    pub user_id: UserId,
    pub updated_at: DateTime<Utc>,
}

/// Data for UserDeleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDeletedData {
    pub user_id: UserId,
    pub deleted_at: DateTime<Utc>,
}

/// Data for WishlistCreated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistCreatedData {
    pub wishlist_id: WishlistId,
    pub owner_id: UserId,
    pub name: String,
    pub public: bool,
    pub created_at: DateTime<Utc>,
}

/// Data for WishlistRenamed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistRenamedData {
    pub wishlist_id: WishlistId,
    pub old_name: String,
    pub new_name: String,
}

/// Data for WishlistVisibilityChanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistVisibilityChangedData {
    pub wishlist_id: WishlistId,
    pub public: bool,
}

/// Data for WishlistReordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistReorderedData {
    pub wishlist_id: WishlistId,
    pub old_order: i32,
    pub new_order: i32,
}

/// Data for WishlistDeleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistDeletedData {
    pub wishlist_id: WishlistId,
    pub owner_id: UserId,
    pub deleted_at: DateTime<Utc>,
}

/// Data for ItemAdded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAddedData {
    pub item_id: ItemId,
    pub wishlist_id: WishlistId,
    pub name: String,
    pub added_at: DateTime<Utc>,
}

/// Data for ItemUpdated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdatedData {
    pub item_id: ItemId,
    pub wishlist_id: WishlistId,
    pub updated_at: DateTime<Utc>,
}

/// Data for ItemReordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemReorderedData {
    pub item_id: ItemId,
    pub wishlist_id: WishlistId,
    pub old_order: i32,
    pub new_order: i32,
}

/// Data for ItemRemoved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRemovedData {
    pub item_id: ItemId,
    pub wishlist_id: WishlistId,
    pub removed_at: DateTime<Utc>,
}

/// Data for ReservationToggled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationToggledData {
    pub item_id: ItemId,
    pub wishlist_id: WishlistId,
    pub user_id: UserId,
    pub reserved: bool,
    pub toggled_at: DateTime<Utc>,
}

/// Data for ShareLinkCreated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLinkCreatedData {
    pub link_id: ShareLinkId,
    pub wishlist_id: WishlistId,
    pub share_code: ShareCode,
    pub created_at: DateTime<Utc>,
}

/// Data for LinkVisited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkVisitedData {
    pub visit_id: VisitId,
    pub link_id: ShareLinkId,
    pub user_id: UserId,
    pub visited_at: DateTime<Utc>,
}

// Convenience constructors
impl DomainEvent {
    pub fn user_registered(user_id: UserId, username: impl Into<String>) -> Self {
        DomainEvent::UserRegistered(UserRegisteredData {
            user_id,
            username: username.into(),
            registered_at: Utc::now(),
        })
    }

    pub fn user_profile_updated(user_id: UserId) -> Self {
        DomainEvent::UserProfileUpdated(UserProfileUpdatedData {
            user_id,
            updated_at: Utc::now(),
        })
    }

    pub fn user_deleted(user_id: UserId) -> Self {
        DomainEvent::UserDeleted(UserDeletedData {
            user_id,
            deleted_at: Utc::now(),
        })
    }

    pub fn wishlist_created(
        wishlist_id: WishlistId,
        owner_id: UserId,
        name: impl Into<String>,
        public: bool,
    ) -> Self {
        DomainEvent::WishlistCreated(WishlistCreatedData {
            wishlist_id,
            owner_id,
            name: name.into(),
            public,
            created_at: Utc::now(),
        })
    }

    pub fn wishlist_renamed(
        wishlist_id: WishlistId,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        DomainEvent::WishlistRenamed(WishlistRenamedData {
            wishlist_id,
            old_name: old_name.into(),
            new_name: new_name.into(),
        })
    }

    pub fn wishlist_visibility_changed(wishlist_id: WishlistId, public: bool) -> Self {
        DomainEvent::WishlistVisibilityChanged(WishlistVisibilityChangedData {
            wishlist_id,
            public,
        })
    }

    pub fn wishlist_reordered(wishlist_id: WishlistId, old_order: i32, new_order: i32) -> Self {
        DomainEvent::WishlistReordered(WishlistReorderedData {
            wishlist_id,
            old_order,
            new_order,
        })
    }

    pub fn wishlist_deleted(wishlist_id: WishlistId, owner_id: UserId) -> Self {
        DomainEvent::WishlistDeleted(WishlistDeletedData {
            wishlist_id,
            owner_id,
            deleted_at: Utc::now(),
        })
    }

    pub fn item_added(item_id: ItemId, wishlist_id: WishlistId, name: impl Into<String>) -> Self {
        DomainEvent::ItemAdded(ItemAddedData {
            item_id,
            wishlist_id,
            name: name.into(),
            added_at: Utc::now(),
        })
    }

    pub fn item_updated(item_id: ItemId, wishlist_id: WishlistId) -> Self {
        DomainEvent::ItemUpdated(ItemUpdatedData {
            item_id,
            wishlist_id,
            updated_at: Utc::now(),
        })
    }

    pub fn item_reordered(
        item_id: ItemId,
        wishlist_id: WishlistId,
        old_order: i32,
        new_order: i32,
    ) -> Self {
        DomainEvent::ItemReordered(ItemReorderedData {
            item_id,
            wishlist_id,
            old_order,
            new_order,
        })
    }

    pub fn item_removed(item_id: ItemId, wishlist_id: WishlistId) -> Self {
        DomainEvent::ItemRemoved(ItemRemovedData {
            item_id,
            wishlist_id,
            removed_at: Utc::now(),
        })
    }

    pub fn reservation_toggled(
        item_id: ItemId,
        wishlist_id: WishlistId,
        user_id: UserId,
        reserved: bool,
    ) -> Self {
        DomainEvent::ReservationToggled(ReservationToggledData {
            item_id,
            wishlist_id,
            user_id,
            reserved,
            toggled_at: Utc::now(),
        })
    }

    pub fn share_link_created(
        link_id: ShareLinkId,
        wishlist_id: WishlistId,
        share_code: ShareCode,
    ) -> Self {
        DomainEvent::ShareLinkCreated(ShareLinkCreatedData {
            link_id,
            wishlist_id,
            share_code,
            created_at: Utc::now(),
        })
    }

    pub fn link_visited(visit_id: VisitId, link_id: ShareLinkId, user_id: UserId) -> Self {
        DomainEvent::LinkVisited(LinkVisitedData {
            visit_id,
            link_id,
            user_id,
            visited_at: Utc::now(),
        })
    }
}
