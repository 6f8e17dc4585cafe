//! Repository capability traits and the unit-of-work contract.

use async_trait::async_trait;
use common::{ItemId, ShareLinkId, UserId, VisitId, WishlistId};
use domain::{SharedLink, SharedLinkVisit, User, Wishlist, WishlistItem};

use crate::error::Result;

/// User aggregate repository.
#[async_trait]
pub trait UserRepository: Send {
    /// Returns a user by ID.
    async fn user(&self, id: &UserId) -> Result<Option<User>>;

    /// Returns a user by exact username.
    async fn user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Returns a user by exact email.
    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Stages a new user, draining its pending events.
    async fn add_user(&mut self, user: User) -> Result<()>;

    /// Stages an update, draining the entity's pending events.
    async fn update_user(&mut self, user: User) -> Result<()>;

    /// Stages a removal, draining the entity's pending events.
    async fn remove_user(&mut self, user: User) -> Result<()>;
}

/// Wishlist aggregate repository.
#[async_trait]
pub trait WishlistRepository: Send {
    /// Returns a wishlist by ID.
    async fn wishlist(&self, id: &WishlistId) -> Result<Option<Wishlist>>;

    /// Returns all wishlists owned by a user, in no particular order.
    async fn wishlists_by_owner(&self, owner_id: &UserId) -> Result<Vec<Wishlist>>;

    /// Stages a new wishlist, draining its pending events.
    async fn add_wishlist(&mut self, wishlist: Wishlist) -> Result<()>;

    /// Stages an update, draining the entity's pending events.
    async fn update_wishlist(&mut self, wishlist: Wishlist) -> Result<()>;

    /// Stages a removal, draining the entity's pending events.
    async fn remove_wishlist(&mut self, wishlist: Wishlist) -> Result<()>;
}

/// Wishlist item repository.
#[async_trait]
pub trait ItemRepository: Send {
    /// Returns an item by ID.
    async fn item(&self, id: &ItemId) -> Result<Option<WishlistItem>>;

    /// Returns all items of a wishlist, in no particular order.
    async fn items_by_wishlist(&self, wishlist_id: &WishlistId) -> Result<Vec<WishlistItem>>;

    /// Stages a new item, draining its pending events.
    async fn add_item(&mut self, item: WishlistItem) -> Result<()>;

    /// Stages an update, draining the entity's pending events.
    async fn update_item(&mut self, item: WishlistItem) -> Result<()>;

    /// Stages a removal, draining the entity's pending events.
    async fn remove_item(&mut self, item: WishlistItem) -> Result<()>;
}

/// Share link repository.
#[async_trait]
pub trait ShareLinkRepository: Send {
    /// Returns a share link by ID.
    async fn link(&self, id: &ShareLinkId) -> Result<Option<SharedLink>>;

    /// Returns the share link of a wishlist, if one was generated.
    async fn link_by_wishlist(&self, wishlist_id: &WishlistId) -> Result<Option<SharedLink>>;

    /// Resolves a share code to its link.
    async fn link_by_code(&self, code: &str) -> Result<Option<SharedLink>>;

    /// Stages a new link, draining its pending events.
    async fn add_link(&mut self, link: SharedLink) -> Result<()>;

    /// Stages a removal, draining the entity's pending events.
    async fn remove_link(&mut self, link: SharedLink) -> Result<()>;
}

/// Share link visit repository.
#[async_trait]
pub trait VisitRepository: Send {
    /// Returns the visit record for a (link, user) pair, if any.
    async fn visit(&self, link_id: &ShareLinkId, user_id: &UserId)
    -> Result<Option<SharedLinkVisit>>;

    /// Returns all visits recorded for a user.
    async fn visits_by_user(&self, user_id: &UserId) -> Result<Vec<SharedLinkVisit>>;

    /// Returns all visits recorded for a link.
    async fn visits_by_link(&self, link_id: &ShareLinkId) -> Result<Vec<SharedLinkVisit>>;

    /// Stages a new visit record, draining its pending events.
    async fn add_visit(&mut self, visit: SharedLinkVisit) -> Result<()>;

    /// Stages a removal.
    async fn remove_visit(&mut self, visit: SharedLinkVisit) -> Result<()>;
}

/// A unit of work over all repositories.
///
/// Reads observe committed state only; writes are staged on the session and
/// become visible atomically when [`Session::commit`] succeeds. Commit is the
/// trigger point for domain event dispatch and may be called at most once.
#[async_trait]
pub trait Session:
    UserRepository
    + WishlistRepository
    + ItemRepository
    + ShareLinkRepository
    + VisitRepository
    + Send
    + Sync
{
    /// Persists all staged changes atomically, then dispatches the domain
    /// events drained from the staged entities.
    ///
    /// Fails with [`crate::StoreError::UniqueViolation`] when the staged
    /// changes would break a unique constraint, in which case nothing is
    /// applied and nothing is dispatched.
    async fn commit(&mut self) -> Result<()>;
}

/// Hands out one session per request.
pub trait Store: Send + Sync {
    /// Begins a fresh unit of work.
    fn begin(&self) -> Box<dyn Session>;
}
