//! Toggle item reservation command.

use std::sync::Arc;

use async_trait::async_trait;
use common::{ItemId, UserId, WishlistId};
use store::{ItemRepository, Session, Store};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::dto::SharedItemDto;
use crate::error::AppError;
use crate::items::load_item_in_wishlist;
use crate::validate::{FieldViolation, Violations};

/// Sets or clears the caller's reservation on an item.
///
/// One user holds at most one reservation per wishlist. The handler scans
/// siblings before reserving; the storage constraint re-checks the rule at
/// commit, so two racing requests cannot both win.
#[derive(Debug, Clone)]
pub struct ToggleItemReservation {
    pub item_id: ItemId,
    pub wishlist_id: WishlistId,
    pub user_id: UserId,
}

impl RequestMeta for ToggleItemReservation {
    fn name(&self) -> &'static str {
        "ToggleItemReservation"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.into_vec()
    }
}

impl Request for ToggleItemReservation {
    type Output = SharedItemDto;
}

pub struct ToggleItemReservationHandler {
    store: Arc<dyn Store>,
}

impl ToggleItemReservationHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler<ToggleItemReservation> for ToggleItemReservationHandler {
    #[tracing::instrument(skip(self, ctx))]
    async fn handle(
        &self,
        request: ToggleItemReservation,
        ctx: &RequestContext,
    ) -> Result<SharedItemDto, AppError> {
        let mut session = self.store.begin();

        let (mut item, _wishlist) =
            load_item_in_wishlist(session.as_ref(), &request.item_id, &request.wishlist_id).await?;

        if !item.is_reserved() {
            let siblings = session.items_by_wishlist(&request.wishlist_id).await?;
            if siblings
                .iter()
                .any(|sibling| sibling.is_reserved_by(&request.user_id))
            {
                return Err(AppError::conflict(
                    "user already holds a reservation in this wishlist",
                ));
            }
        }

        item.toggle_reservation(&request.user_id)?;
        let dto = SharedItemDto::project(&item, Some(&request.user_id));

        session.update_item(item).await?;
        ctx.ensure_active()?;
        session.commit().await?;

        Ok(dto)
    }
}
