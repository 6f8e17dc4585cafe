//! Projections returned by handlers.
//!
//! Handlers never return raw entities. These shapes omit internal-only
//! fields, and the owner-facing item projection carries no reservation state
//! at all so the list owner cannot learn what was reserved.

use chrono::{DateTime, NaiveDate, Utc};
use common::{ItemId, ShareCode, UserId, WishlistId};
use domain::{SharedLink, User, Wishlist, WishlistItem};
use serde::Serialize;

/// A wishlist as seen by its owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WishlistDto {
    pub id: WishlistId,
    pub name: String,
    pub public: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&Wishlist> for WishlistDto {
    fn from(wishlist: &Wishlist) -> Self {
        Self {
            id: wishlist.id(),
            name: wishlist.name().to_string(),
            public: wishlist.is_public(),
            order: wishlist.order(),
            created_at: wishlist.created_at(),
        }
    }
}

/// An item as seen by its owner. No reservation fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemDto {
    pub id: ItemId,
    pub wishlist_id: WishlistId,
    pub name: String,
    pub link: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&WishlistItem> for ItemDto {
    fn from(item: &WishlistItem) -> Self {
        Self {
            id: item.id(),
            wishlist_id: item.wishlist_id(),
            name: item.name().to_string(),
            link: item.link().map(str::to_string),
            image: item.image().map(str::to_string),
            description: item.description().map(str::to_string),
            order: item.order(),
            created_at: item.created_at(),
        }
    }
}

/// A wishlist with its items, owner view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WishlistDetailsDto {
    pub id: WishlistId,
    pub name: String,
    pub public: bool,
    pub order: i32,
    pub items: Vec<ItemDto>,
}

/// An item as seen through a share link.
///
/// `reserved` tells visitors the item is taken; `reserved_by_me` tells the
/// viewer whether they hold it. Who else reserved is never exposed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedItemDto {
    pub id: ItemId,
    pub name: String,
    pub link: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub order: i32,
    pub reserved: bool,
    pub reserved_by_me: bool,
}

impl SharedItemDto {
    /// Projects an item for the given viewer (anonymous when `None`).
    pub fn project(item: &WishlistItem, viewer: Option<&UserId>) -> Self {
        Self {
            id: item.id(),
            name: item.name().to_string(),
            link: item.link().map(str::to_string),
            image: item.image().map(str::to_string),
            description: item.description().map(str::to_string),
            order: item.order(),
            reserved: item.is_reserved(),
            reserved_by_me: viewer.is_some_and(|viewer| item.is_reserved_by(viewer)),
        }
    }
}

/// A wishlist resolved through a share code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedWishlistDto {
    pub id: WishlistId,
    pub name: String,
    pub owner_id: UserId,
    pub owner_name: String,
    pub items: Vec<SharedItemDto>,
}

/// The share link of a wishlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareLinkDto {
    pub wishlist_id: WishlistId,
    pub share_code: ShareCode,
}

impl From<&SharedLink> for ShareLinkDto {
    fn from(link: &SharedLink) -> Self {
        Self {
            wishlist_id: link.wishlist_id(),
            share_code: link.code().clone(),
        }
    }
}

/// A user profile, returned to that user only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDto {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().clone(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            bio: user.bio().map(str::to_string),
            avatar: user.avatar().map(str::to_string),
            date_of_birth: user.date_of_birth(),
            created_at: user.created_at(),
        }
    }
}

/// A wishlist summary inside a shared-with-me group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedSummaryDto {
    pub wishlist_id: WishlistId,
    pub name: String,
    pub share_code: ShareCode,
}

/// Wishlists shared with the caller, grouped by their owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedOwnerGroupDto {
    pub owner_id: UserId,
    pub owner_name: String,
    pub wishlists: Vec<SharedSummaryDto>,
}
