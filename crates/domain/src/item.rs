//! Wishlist item entity.

use chrono::{DateTime, Utc};
use common::{ItemId, UserId, WishlistId};
use serde::{Deserialize, Serialize};

use crate::error::WishlistError;
use crate::event::{DomainEvent, EventSource};

/// A single gift idea inside a wishlist.
///
/// The parent wishlist is fixed at creation. Reservation state is a single
/// `Option<UserId>`, so the "reserved flag implies a reserving user" rule
/// holds by construction. The one-reservation-per-wishlist-per-user rule
/// spans siblings and is enforced by the reservation handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItem {
    id: ItemId,
    wishlist_id: WishlistId,
    name: String,
    link: Option<String>,
    image: Option<String>,
    description: Option<String>,
    reserved_by: Option<UserId>,
    order: i32,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    pending: Vec<DomainEvent>,
}

impl WishlistItem {
    /// Creates a new unreserved item, raising a creation event.
    pub fn new(
        wishlist_id: WishlistId,
        name: impl Into<String>,
        link: Option<String>,
        order: i32,
    ) -> Result<Self, WishlistError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(WishlistError::EmptyField("name"));
        }

        let mut item = Self {
            id: ItemId::new(),
            wishlist_id,
            name,
            link,
            image: None,
            description: None,
            reserved_by: None,
            order,
            created_at: Utc::now(),
            pending: Vec::new(),
        };
        item.pending.push(DomainEvent::item_added(
            item.id,
            item.wishlist_id,
            item.name.clone(),
        ));
        Ok(item)
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn wishlist_id(&self) -> WishlistId {
        self.wishlist_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_reserved(&self) -> bool {
        self.reserved_by.is_some()
    }

    pub fn reserved_by(&self) -> Option<&UserId> {
        self.reserved_by.as_ref()
    }

    /// Returns true if this item is reserved by the given user.
    pub fn is_reserved_by(&self, user_id: &UserId) -> bool {
        self.reserved_by.as_ref() == Some(user_id)
    }

    /// Replaces name, link, and description. No event when nothing changed.
    pub fn update_details(
        &mut self,
        name: impl Into<String>,
        link: Option<String>,
        description: Option<String>,
    ) -> Result<(), WishlistError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(WishlistError::EmptyField("name"));
        }
        if name == self.name && link == self.link && description == self.description {
            return Ok(());
        }

        self.name = name;
        self.link = link;
        self.description = description;
        self.pending
            .push(DomainEvent::item_updated(self.id, self.wishlist_id));
        Ok(())
    }

    /// Replaces the image reference. No event when unchanged.
    pub fn set_image(&mut self, image: Option<String>) {
        if image == self.image {
            return;
        }
        self.image = image;
        self.pending
            .push(DomainEvent::item_updated(self.id, self.wishlist_id));
    }

    /// Assigns a new display order. A no-op change raises no event.
    pub fn reorder(&mut self, new_order: i32) {
        if new_order == self.order {
            return;
        }
        let old_order = std::mem::replace(&mut self.order, new_order);
        self.pending.push(DomainEvent::item_reordered(
            self.id,
            self.wishlist_id,
            old_order,
            new_order,
        ));
    }

    /// Toggles the reservation for the given user.
    ///
    /// Clears the reservation when the caller holds it, sets it when the item
    /// is free, and fails with [`WishlistError::ReservedByAnother`] when a
    /// different user holds it. Returns the resulting reserved state.
    pub fn toggle_reservation(&mut self, user_id: &UserId) -> Result<bool, WishlistError> {
        match &self.reserved_by {
            Some(holder) if holder == user_id => {
                self.reserved_by = None;
                self.pending.push(DomainEvent::reservation_toggled(
                    self.id,
                    self.wishlist_id,
                    user_id.clone(),
                    false,
                ));
                Ok(false)
            }
            Some(_) => Err(WishlistError::ReservedByAnother),
            None => {
                self.reserved_by = Some(user_id.clone());
                self.pending.push(DomainEvent::reservation_toggled(
                    self.id,
                    self.wishlist_id,
                    user_id.clone(),
                    true,
                ));
                Ok(true)
            }
        }
    }

    /// Raises the removal event. Physical removal happens in the repository.
    pub fn mark_deleted(&mut self) {
        self.pending
            .push(DomainEvent::item_removed(self.id, self.wishlist_id));
    }
}

impl EventSource for WishlistItem {
    fn pending_events(&self) -> &[DomainEvent] {
        &self.pending
    }

    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> WishlistItem {
        let mut item = WishlistItem::new(WishlistId::new(), "Book", None, 0).unwrap();
        item.take_events();
        item
    }

    #[test]
    fn new_item_is_unreserved() {
        let item = WishlistItem::new(WishlistId::new(), "Book", Some("https://example.com".into()), 2)
            .unwrap();
        assert!(!item.is_reserved());
        assert!(item.reserved_by().is_none());
        assert_eq!(item.order(), 2);
        assert_eq!(item.pending_events()[0].event_type(), "ItemAdded");
    }

    #[test]
    fn toggle_sets_reservation_when_free() {
        let mut item = item();
        let user = UserId::new("visitor-1");

        let reserved = item.toggle_reservation(&user).unwrap();

        assert!(reserved);
        assert!(item.is_reserved_by(&user));
        let events = item.take_events();
        match &events[0] {
            DomainEvent::ReservationToggled(data) => {
                assert!(data.reserved);
                assert_eq!(data.user_id, user);
            }
            other => panic!("unexpected event {}", other.event_type()),
        }
    }

    #[test]
    fn toggle_clears_own_reservation() {
        let mut item = item();
        let user = UserId::new("visitor-1");
        item.toggle_reservation(&user).unwrap();

        let reserved = item.toggle_reservation(&user).unwrap();

        assert!(!reserved);
        assert!(!item.is_reserved());
    }

    #[test]
    fn toggle_rejects_foreign_reservation() {
        let mut item = item();
        item.toggle_reservation(&UserId::new("visitor-1")).unwrap();

        let result = item.toggle_reservation(&UserId::new("visitor-2"));

        assert_eq!(result.unwrap_err(), WishlistError::ReservedByAnother);
        assert!(item.is_reserved_by(&UserId::new("visitor-1")));
    }

    #[test]
    fn update_details_raises_single_event() {
        let mut item = item();
        item.update_details("Hardcover Book", Some("https://shop.example".into()), None)
            .unwrap();

        assert_eq!(item.name(), "Hardcover Book");
        assert_eq!(item.take_events().len(), 1);
    }

    #[test]
    fn unchanged_update_raises_nothing() {
        let mut item = item();
        item.update_details("Book", None, None).unwrap();
        item.set_image(None);
        item.reorder(0);
        assert!(item.pending_events().is_empty());
    }

    #[test]
    fn set_image_raises_update_event() {
        let mut item = item();
        item.set_image(Some("blob://1/book.jpg".into()));
        assert_eq!(item.image(), Some("blob://1/book.jpg"));
        assert_eq!(item.take_events()[0].event_type(), "ItemUpdated");
    }
}
