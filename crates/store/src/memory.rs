use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use common::{ItemId, ShareLinkId, UserId, VisitId, WishlistId};
use domain::{
    DomainEvent, EventChannel, EventSource, SharedLink, SharedLinkVisit, User, Wishlist,
    WishlistItem,
};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::traits::{
    ItemRepository, Session, ShareLinkRepository, Store, UserRepository, VisitRepository,
    WishlistRepository,
};

/// In-memory store implementation.
///
/// Backs tests and local runs with the same session contract a relational
/// implementation would provide: staged writes, atomic commit under a write
/// lock, unique-constraint validation, and post-commit event dispatch.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<Tables>>,
    channel: Arc<EventChannel>,
}

impl MemoryStore {
    /// Creates an empty store with no event subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store dispatching committed events to `channel`.
    pub fn with_channel(channel: Arc<EventChannel>) -> Self {
        Self {
            state: Arc::new(RwLock::new(Tables::default())),
            channel,
        }
    }

    /// Returns the number of committed wishlists.
    pub async fn wishlist_count(&self) -> usize {
        self.state.read().await.wishlists.len()
    }

    /// Returns the number of committed items.
    pub async fn item_count(&self) -> usize {
        self.state.read().await.items.len()
    }

    /// Returns the number of committed visit records.
    pub async fn visit_count(&self) -> usize {
        self.state.read().await.visits.len()
    }

    /// Clears all committed state.
    pub async fn clear(&self) {
        *self.state.write().await = Tables::default();
    }
}

impl Store for MemoryStore {
    fn begin(&self) -> Box<dyn Session> {
        Box::new(MemorySession {
            state: Arc::clone(&self.state),
            channel: Arc::clone(&self.channel),
            staged: Vec::new(),
            queued_events: Vec::new(),
            committed: false,
        })
    }
}

#[derive(Clone, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    wishlists: HashMap<WishlistId, Wishlist>,
    items: HashMap<ItemId, WishlistItem>,
    links: HashMap<ShareLinkId, SharedLink>,
    visits: HashMap<VisitId, SharedLinkVisit>,
}

impl Tables {
    fn apply(&mut self, op: StagedOp) {
        match op {
            StagedOp::PutUser(user) => {
                self.users.insert(user.id().clone(), user);
            }
            StagedOp::DeleteUser(id) => {
                self.users.remove(&id);
            }
            StagedOp::PutWishlist(wishlist) => {
                self.wishlists.insert(wishlist.id(), wishlist);
            }
            StagedOp::DeleteWishlist(id) => {
                self.wishlists.remove(&id);
            }
            StagedOp::PutItem(item) => {
                self.items.insert(item.id(), item);
            }
            StagedOp::DeleteItem(id) => {
                self.items.remove(&id);
            }
            StagedOp::PutLink(link) => {
                self.links.insert(link.id(), link);
            }
            StagedOp::DeleteLink(id) => {
                self.links.remove(&id);
            }
            StagedOp::PutVisit(visit) => {
                self.visits.insert(visit.id(), visit);
            }
            StagedOp::DeleteVisit(id) => {
                self.visits.remove(&id);
            }
        }
    }

    /// Validates the unique constraints of the data model.
    ///
    /// Runs against the post-apply state, under the store's write lock, so a
    /// conflicting session that slipped in between a handler's read and its
    /// commit is still caught here.
    fn check_unique_constraints(&self) -> Result<()> {
        let mut usernames = HashSet::new();
        let mut emails = HashSet::new();
        for user in self.users.values() {
            if !usernames.insert(user.username()) {
                return Err(StoreError::unique("users.username", user.username()));
            }
            if !emails.insert(user.email()) {
                return Err(StoreError::unique("users.email", user.email()));
            }
        }

        let mut linked_wishlists = HashSet::new();
        let mut codes = HashSet::new();
        for link in self.links.values() {
            if !linked_wishlists.insert(link.wishlist_id()) {
                return Err(StoreError::unique(
                    "links.wishlist_id",
                    link.wishlist_id().to_string(),
                ));
            }
            if !codes.insert(link.code().as_str()) {
                return Err(StoreError::unique("links.code", link.code().as_str()));
            }
        }

        let mut visited = HashSet::new();
        for visit in self.visits.values() {
            if !visited.insert((visit.link_id(), visit.user_id().clone())) {
                return Err(StoreError::unique(
                    "visits.link_id_user_id",
                    format!("{}/{}", visit.link_id(), visit.user_id()),
                ));
            }
        }

        let mut reservations = HashSet::new();
        for item in self.items.values() {
            if let Some(user_id) = item.reserved_by()
                && !reservations.insert((item.wishlist_id(), user_id.clone()))
            {
                return Err(StoreError::unique(
                    "items.wishlist_id_reserved_by",
                    format!("{}/{}", item.wishlist_id(), user_id),
                ));
            }
        }

        Ok(())
    }
}

enum StagedOp {
    PutUser(User),
    DeleteUser(UserId),
    PutWishlist(Wishlist),
    DeleteWishlist(WishlistId),
    PutItem(WishlistItem),
    DeleteItem(ItemId),
    PutLink(SharedLink),
    DeleteLink(ShareLinkId),
    PutVisit(SharedLinkVisit),
    DeleteVisit(VisitId),
}

/// A unit of work over a [`MemoryStore`].
///
/// Writes accumulate in `staged`; entity events drain into `queued_events`
/// at staging time and are dispatched only after a successful commit.
pub struct MemorySession {
    state: Arc<RwLock<Tables>>,
    channel: Arc<EventChannel>,
    staged: Vec<StagedOp>,
    queued_events: Vec<DomainEvent>,
    committed: bool,
}

impl MemorySession {
    fn stage(&mut self, events: Vec<DomainEvent>, op: StagedOp) -> Result<()> {
        if self.committed {
            return Err(StoreError::SessionClosed);
        }
        self.queued_events.extend(events);
        self.staged.push(op);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemorySession {
    async fn user(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.state.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username() == username)
            .cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.state.read().await;
        Ok(tables.users.values().find(|u| u.email() == email).cloned())
    }

    async fn add_user(&mut self, mut user: User) -> Result<()> {
        let events = user.take_events();
        self.stage(events, StagedOp::PutUser(user))
    }

    async fn update_user(&mut self, mut user: User) -> Result<()> {
        let events = user.take_events();
        self.stage(events, StagedOp::PutUser(user))
    }

    async fn remove_user(&mut self, mut user: User) -> Result<()> {
        let events = user.take_events();
        let id = user.id().clone();
        self.stage(events, StagedOp::DeleteUser(id))
    }
}

#[async_trait]
impl WishlistRepository for MemorySession {
    async fn wishlist(&self, id: &WishlistId) -> Result<Option<Wishlist>> {
        Ok(self.state.read().await.wishlists.get(id).cloned())
    }

    async fn wishlists_by_owner(&self, owner_id: &UserId) -> Result<Vec<Wishlist>> {
        let tables = self.state.read().await;
        Ok(tables
            .wishlists
            .values()
            .filter(|w| w.owner_id() == owner_id)
            .cloned()
            .collect())
    }

    async fn add_wishlist(&mut self, mut wishlist: Wishlist) -> Result<()> {
        let events = wishlist.take_events();
        self.stage(events, StagedOp::PutWishlist(wishlist))
    }

    async fn update_wishlist(&mut self, mut wishlist: Wishlist) -> Result<()> {
        let events = wishlist.take_events();
        self.stage(events, StagedOp::PutWishlist(wishlist))
    }

    async fn remove_wishlist(&mut self, mut wishlist: Wishlist) -> Result<()> {
        let events = wishlist.take_events();
        let id = wishlist.id();
        self.stage(events, StagedOp::DeleteWishlist(id))
    }
}

#[async_trait]
impl ItemRepository for MemorySession {
    async fn item(&self, id: &ItemId) -> Result<Option<WishlistItem>> {
        Ok(self.state.read().await.items.get(id).cloned())
    }

    async fn items_by_wishlist(&self, wishlist_id: &WishlistId) -> Result<Vec<WishlistItem>> {
        let tables = self.state.read().await;
        Ok(tables
            .items
            .values()
            .filter(|i| i.wishlist_id() == *wishlist_id)
            .cloned()
            .collect())
    }

    async fn add_item(&mut self, mut item: WishlistItem) -> Result<()> {
        let events = item.take_events();
        self.stage(events, StagedOp::PutItem(item))
    }

    async fn update_item(&mut self, mut item: WishlistItem) -> Result<()> {
        let events = item.take_events();
        self.stage(events, StagedOp::PutItem(item))
    }

    async fn remove_item(&mut self, mut item: WishlistItem) -> Result<()> {
        let events = item.take_events();
        let id = item.id();
        self.stage(events, StagedOp::DeleteItem(id))
    }
}

#[async_trait]
impl ShareLinkRepository for MemorySession {
    async fn link(&self, id: &ShareLinkId) -> Result<Option<SharedLink>> {
        Ok(self.state.read().await.links.get(id).cloned())
    }

    async fn link_by_wishlist(&self, wishlist_id: &WishlistId) -> Result<Option<SharedLink>> {
        let tables = self.state.read().await;
        Ok(tables
            .links
            .values()
            .find(|l| l.wishlist_id() == *wishlist_id)
            .cloned())
    }

    async fn link_by_code(&self, code: &str) -> Result<Option<SharedLink>> {
        let tables = self.state.read().await;
        Ok(tables
            .links
            .values()
            .find(|l| l.code().as_str() == code)
            .cloned())
    }

    async fn add_link(&mut self, mut link: SharedLink) -> Result<()> {
        let events = link.take_events();
        self.stage(events, StagedOp::PutLink(link))
    }

    async fn remove_link(&mut self, mut link: SharedLink) -> Result<()> {
        let events = link.take_events();
        let id = link.id();
        self.stage(events, StagedOp::DeleteLink(id))
    }
}

#[async_trait]
impl VisitRepository for MemorySession {
    async fn visit(
        &self,
        link_id: &ShareLinkId,
        user_id: &UserId,
    ) -> Result<Option<SharedLinkVisit>> {
        let tables = self.state.read().await;
        Ok(tables
            .visits
            .values()
            .find(|v| v.link_id() == *link_id && v.user_id() == user_id)
            .cloned())
    }

    async fn visits_by_user(&self, user_id: &UserId) -> Result<Vec<SharedLinkVisit>> {
        let tables = self.state.read().await;
        Ok(tables
            .visits
            .values()
            .filter(|v| v.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn visits_by_link(&self, link_id: &ShareLinkId) -> Result<Vec<SharedLinkVisit>> {
        let tables = self.state.read().await;
        Ok(tables
            .visits
            .values()
            .filter(|v| v.link_id() == *link_id)
            .cloned()
            .collect())
    }

    async fn add_visit(&mut self, mut visit: SharedLinkVisit) -> Result<()> {
        let events = visit.take_events();
        self.stage(events, StagedOp::PutVisit(visit))
    }

    async fn remove_visit(&mut self, mut visit: SharedLinkVisit) -> Result<()> {
        let events = visit.take_events();
        let id = visit.id();
        self.stage(events, StagedOp::DeleteVisit(id))
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn commit(&mut self) -> Result<()> {
        if self.committed {
            return Err(StoreError::SessionClosed);
        }
        self.committed = true;

        {
            let mut tables = self.state.write().await;
            let mut next = tables.clone();
            for op in self.staged.drain(..) {
                next.apply(op);
            }
            next.check_unique_constraints()?;
            *tables = next;
        }

        metrics::counter!("store_commits").increment(1);

        let events = std::mem::take(&mut self.queued_events);
        if !events.is_empty() {
            tracing::debug!(count = events.len(), "dispatching events after commit");
            self.channel.dispatch(&events).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ShareCode;
    use domain::{EventSubscriber, SubscriberError};
    use std::sync::Mutex;

    fn wishlist(owner: &str, name: &str) -> Wishlist {
        Wishlist::new(UserId::new(owner), name, false, 0).unwrap()
    }

    #[tokio::test]
    async fn staged_writes_are_invisible_until_commit() {
        let store = MemoryStore::new();
        let w = wishlist("owner-1", "Birthday");
        let id = w.id();

        let mut session = store.begin();
        session.add_wishlist(w).await.unwrap();

        let other = store.begin();
        assert!(other.wishlist(&id).await.unwrap().is_none());

        session.commit().await.unwrap();
        assert!(other.wishlist(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn dropped_session_leaves_no_trace() {
        let store = MemoryStore::new();
        {
            let mut session = store.begin();
            session.add_wishlist(wishlist("owner-1", "A")).await.unwrap();
        }
        assert_eq!(store.wishlist_count().await, 0);
    }

    #[tokio::test]
    async fn commit_twice_fails() {
        let store = MemoryStore::new();
        let mut session = store.begin();
        session.commit().await.unwrap();
        assert!(matches!(
            session.commit().await,
            Err(StoreError::SessionClosed)
        ));
    }

    #[tokio::test]
    async fn writes_after_commit_fail() {
        let store = MemoryStore::new();
        let mut session = store.begin();
        session.commit().await.unwrap();
        let result = session.add_wishlist(wishlist("owner-1", "A")).await;
        assert!(matches!(result, Err(StoreError::SessionClosed)));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = MemoryStore::new();

        let mut session = store.begin();
        session
            .add_user(User::register("auth|1".into(), "alice", "a@example.com", None).unwrap())
            .await
            .unwrap();
        session.commit().await.unwrap();

        let mut session = store.begin();
        session
            .add_user(User::register("auth|2".into(), "alice", "b@example.com", None).unwrap())
            .await
            .unwrap();
        let result = session.commit().await;

        assert!(matches!(result, Err(StoreError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn second_share_link_for_same_wishlist_is_rejected() {
        let store = MemoryStore::new();
        let w = wishlist("owner-1", "A");
        let wishlist_id = w.id();

        let mut session = store.begin();
        session.add_wishlist(w).await.unwrap();
        session
            .add_link(SharedLink::new(wishlist_id, ShareCode::from_string("code-1")))
            .await
            .unwrap();
        session.commit().await.unwrap();

        let mut session = store.begin();
        session
            .add_link(SharedLink::new(wishlist_id, ShareCode::from_string("code-2")))
            .await
            .unwrap();
        let result = session.commit().await;

        assert!(matches!(result, Err(StoreError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn concurrent_reservations_by_same_user_conflict_at_commit() {
        let store = MemoryStore::new();
        let w = wishlist("owner-1", "A");
        let wishlist_id = w.id();
        let item_a = WishlistItem::new(wishlist_id, "Book", None, 0).unwrap();
        let item_b = WishlistItem::new(wishlist_id, "Game", None, 1).unwrap();
        let (id_a, id_b) = (item_a.id(), item_b.id());

        let mut session = store.begin();
        session.add_wishlist(w).await.unwrap();
        session.add_item(item_a).await.unwrap();
        session.add_item(item_b).await.unwrap();
        session.commit().await.unwrap();

        // Both sessions read the committed state, where the visitor holds no
        // reservation; only the first commit may win.
        let visitor = UserId::new("visitor-1");
        let mut first = store.begin();
        let mut second = store.begin();

        let mut a = first.item(&id_a).await.unwrap().unwrap();
        a.toggle_reservation(&visitor).unwrap();
        first.update_item(a).await.unwrap();

        let mut b = second.item(&id_b).await.unwrap().unwrap();
        b.toggle_reservation(&visitor).unwrap();
        second.update_item(b).await.unwrap();

        first.commit().await.unwrap();
        let result = second.commit().await;

        assert!(matches!(result, Err(StoreError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn duplicate_visit_is_rejected() {
        let store = MemoryStore::new();
        let link = SharedLink::new(WishlistId::new(), ShareCode::generate(16));
        let link_id = link.id();

        let mut session = store.begin();
        session.add_link(link).await.unwrap();
        session
            .add_visit(SharedLinkVisit::new(link_id, "visitor-1".into()))
            .await
            .unwrap();
        session.commit().await.unwrap();

        let mut session = store.begin();
        session
            .add_visit(SharedLinkVisit::new(link_id, "visitor-1".into()))
            .await
            .unwrap();
        let result = session.commit().await;

        assert!(matches!(result, Err(StoreError::UniqueViolation { .. })));
    }

    struct RecordingSubscriber {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EventSubscriber for RecordingSubscriber {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn handle(
            &self,
            event: &DomainEvent,
        ) -> std::result::Result<(), SubscriberError> {
            self.seen.lock().unwrap().push(event.event_type().to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn events_are_dispatched_only_after_successful_commit() {
        let recording = Arc::new(RecordingSubscriber {
            seen: Mutex::new(Vec::new()),
        });
        let mut channel = EventChannel::new();
        channel.subscribe(recording.clone());
        let store = MemoryStore::with_channel(Arc::new(channel));

        let mut session = store.begin();
        session.add_wishlist(wishlist("owner-1", "A")).await.unwrap();
        assert!(recording.seen.lock().unwrap().is_empty());

        session.commit().await.unwrap();
        assert_eq!(*recording.seen.lock().unwrap(), vec!["WishlistCreated"]);
    }

    #[tokio::test]
    async fn failed_commit_dispatches_nothing() {
        let recording = Arc::new(RecordingSubscriber {
            seen: Mutex::new(Vec::new()),
        });
        let mut channel = EventChannel::new();
        channel.subscribe(recording.clone());
        let store = MemoryStore::with_channel(Arc::new(channel));

        let mut session = store.begin();
        session
            .add_user(User::register("auth|1".into(), "alice", "a@example.com", None).unwrap())
            .await
            .unwrap();
        session.commit().await.unwrap();
        recording.seen.lock().unwrap().clear();

        let mut session = store.begin();
        session
            .add_user(User::register("auth|2".into(), "alice", "b@example.com", None).unwrap())
            .await
            .unwrap();
        assert!(session.commit().await.is_err());
        assert!(recording.seen.lock().unwrap().is_empty());
    }
}
