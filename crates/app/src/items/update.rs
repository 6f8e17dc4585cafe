//! Update wishlist item command.

use std::sync::Arc;

use async_trait::async_trait;
use common::{ItemId, UserId, WishlistId};
use store::{ItemRepository, Session, Store};

use crate::dispatch::{Handler, Request, RequestContext, RequestMeta};
use crate::dto::ItemDto;
use crate::error::AppError;
use crate::items::load_item_in_wishlist;
use crate::ports::{BlobStore, ImageUpload};
use crate::validate::{
    FieldViolation, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, Violations,
};

/// Updates an item's details, optionally replacing its image.
///
/// Image bytes go to the blob store before commit; the stale blob is removed
/// best-effort afterwards.
#[derive(Debug, Clone)]
pub struct UpdateWishlistItem {
    pub item_id: ItemId,
    pub wishlist_id: WishlistId,
    pub user_id: UserId,
    pub name: String,
    pub link: Option<String>,
    pub description: Option<String>,
    pub image: Option<ImageUpload>,
}

impl RequestMeta for UpdateWishlistItem {
    fn name(&self) -> &'static str {
        "UpdateWishlistItem"
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require("userId", self.user_id.as_str());
        v.require("name", &self.name);
        v.max_length("name", &self.name, MAX_NAME_LENGTH);
        v.link("link", self.link.as_deref());
        if let Some(description) = &self.description {
            v.max_length("description", description, MAX_DESCRIPTION_LENGTH);
        }
        if let Some(image) = &self.image {
            v.require("image.filename", &image.filename);
            if image.bytes.is_empty() {
                v.add("image.bytes", "must not be empty");
            }
        }
        v.into_vec()
    }
}

impl Request for UpdateWishlistItem {
    type Output = ItemDto;
}

pub struct UpdateWishlistItemHandler {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
}

impl UpdateWishlistItemHandler {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }
}

#[async_trait]
impl Handler<UpdateWishlistItem> for UpdateWishlistItemHandler {
    #[tracing::instrument(skip(self, request, ctx), fields(item_id = %request.item_id))]
    async fn handle(
        &self,
        request: UpdateWishlistItem,
        ctx: &RequestContext,
    ) -> Result<ItemDto, AppError> {
        let mut session = self.store.begin();

        let (mut item, wishlist) =
            load_item_in_wishlist(session.as_ref(), &request.item_id, &request.wishlist_id).await?;
        if !wishlist.is_owned_by(&request.user_id) {
            return Err(AppError::Forbidden("only the owner can update items"));
        }

        item.update_details(request.name, request.link, request.description)?;

        let stale_image = match request.image {
            Some(upload) => {
                let previous = item.image().map(str::to_string);
                let reference = self.blobs.put(&upload.filename, upload.bytes).await?;
                item.set_image(Some(reference));
                previous
            }
            None => None,
        };

        let dto = ItemDto::from(&item);
        session.update_item(item).await?;
        ctx.ensure_active()?;
        session.commit().await?;

        if let Some(reference) = stale_image
            && let Err(err) = self.blobs.delete(&reference).await
        {
            tracing::warn!(reference = %reference, error = %err, "failed to delete stale image blob");
        }

        Ok(dto)
    }
}
