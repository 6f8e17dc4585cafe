//! Share link and visit record entities.

use chrono::{DateTime, Utc};
use common::{ShareCode, ShareLinkId, UserId, VisitId, WishlistId};
use serde::{Deserialize, Serialize};

use crate::event::{DomainEvent, EventSource};

/// The unguessable link granting read access to one wishlist.
///
/// Created lazily on the first share request, never updated afterwards.
/// Exactly one link exists per wishlist; the code is never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedLink {
    id: ShareLinkId,
    wishlist_id: WishlistId,
    code: ShareCode,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    pending: Vec<DomainEvent>,
}

impl SharedLink {
    /// Creates the share link for a wishlist, raising a creation event.
    pub fn new(wishlist_id: WishlistId, code: ShareCode) -> Self {
        let mut link = Self {
            id: ShareLinkId::new(),
            wishlist_id,
            code,
            created_at: Utc::now(),
            pending: Vec::new(),
        };
        link.pending.push(DomainEvent::share_link_created(
            link.id,
            link.wishlist_id,
            link.code.clone(),
        ));
        link
    }

    pub fn id(&self) -> ShareLinkId {
        self.id
    }

    pub fn wishlist_id(&self) -> WishlistId {
        self.wishlist_id
    }

    pub fn code(&self) -> &ShareCode {
        &self.code
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl EventSource for SharedLink {
    fn pending_events(&self) -> &[DomainEvent] {
        &self.pending
    }

    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.pending)
    }
}

/// Records that a user opened a share link.
///
/// At most one record exists per (link, user) pair; the handler creates one
/// only when no prior record is found, and the storage constraint backs that
/// up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedLinkVisit {
    id: VisitId,
    link_id: ShareLinkId,
    user_id: UserId,
    visited_at: DateTime<Utc>,
    #[serde(skip)]
    pending: Vec<DomainEvent>,
}

impl SharedLinkVisit {
    /// Creates a visit record, raising a visit event.
    pub fn new(link_id: ShareLinkId, user_id: UserId) -> Self {
        let mut visit = Self {
            id: VisitId::new(),
            link_id,
            user_id,
            visited_at: Utc::now(),
            pending: Vec::new(),
        };
        visit.pending.push(DomainEvent::link_visited(
            visit.id,
            visit.link_id,
            visit.user_id.clone(),
        ));
        visit
    }

    pub fn id(&self) -> VisitId {
        self.id
    }

    pub fn link_id(&self) -> ShareLinkId {
        self.link_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn visited_at(&self) -> DateTime<Utc> {
        self.visited_at
    }
}

impl EventSource for SharedLinkVisit {
    fn pending_events(&self) -> &[DomainEvent] {
        &self.pending
    }

    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.pending)
    }
}
