//! Application layer for the wishlist service.
//!
//! One handler per command/query, resolved through an explicit registry and
//! wrapped by the logging and validation behaviors. Handlers load entities
//! through the storage session, enforce ownership and exclusivity rules,
//! commit once, and return projections; domain events drained by the session
//! reach the subscribers only after that commit.

pub mod behaviors;
pub mod config;
pub mod dispatch;
pub mod dto;
pub mod error;
pub mod items;
pub mod ports;
pub mod sharing;
pub mod subscribers;
pub mod telemetry;
pub mod users;
pub mod validate;
pub mod wishlists;

pub use config::AppConfig;
pub use dispatch::{
    Dispatcher, Handler, PipelineBehavior, Request, RequestContext, RequestMeta,
};
pub use error::{AppError, ErrorKind};

use std::sync::Arc;

use domain::EventChannel;
use store::{MemoryStore, Store};

use behaviors::{LoggingBehavior, ValidationBehavior};
use ports::{BlobStore, MemoryBlobStore};
use subscribers::ActivityLogSubscriber;

/// A fully wired in-memory application core.
pub struct App {
    pub dispatcher: Dispatcher,
    pub store: Arc<MemoryStore>,
    pub blobs: Arc<MemoryBlobStore>,
}

/// Wires the default in-memory application: the event channel with the
/// activity log subscriber, memory-backed store and blob store, and every
/// handler registered behind the standard behavior chain.
pub fn build_app(config: &AppConfig) -> App {
    let mut channel = EventChannel::new();
    channel.subscribe(Arc::new(ActivityLogSubscriber));

    let store = Arc::new(MemoryStore::with_channel(Arc::new(channel)));
    let blobs = Arc::new(MemoryBlobStore::new());
    let dispatcher = build_dispatcher(store.clone(), blobs.clone(), config);

    App {
        dispatcher,
        store,
        blobs,
    }
}

/// Registers every handler on a fresh dispatcher.
///
/// This is the complete handler graph; adding a request type means adding
/// exactly one line here.
pub fn build_dispatcher(
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
    config: &AppConfig,
) -> Dispatcher {
    use crate::items::{
        CreateWishlistItem, CreateWishlistItemHandler, DeleteWishlistItem,
        DeleteWishlistItemHandler, ReorderWishlistItems, ReorderWishlistItemsHandler,
        ToggleItemReservation, ToggleItemReservationHandler, UpdateWishlistItem,
        UpdateWishlistItemHandler,
    };
    use crate::sharing::{
        GenerateShareLink, GenerateShareLinkHandler, GetSharedWishlist, GetSharedWishlistHandler,
        GetWishlistsSharedWithMe, GetWishlistsSharedWithMeHandler,
    };
    use crate::users::{
        DeleteUser, DeleteUserHandler, GetUserProfile, GetUserProfileHandler, RegisterUser,
        RegisterUserHandler, UpdateUserProfile, UpdateUserProfileHandler,
    };
    use crate::wishlists::{
        CreateWishlist, CreateWishlistHandler, DeleteWishlist, DeleteWishlistHandler, GetWishlist,
        GetWishlistHandler, GetWishlists, GetWishlistsHandler, ReorderWishlists,
        ReorderWishlistsHandler, UpdateWishlist, UpdateWishlistHandler,
    };

    let mut dispatcher = Dispatcher::new()
        .with_behavior(Arc::new(LoggingBehavior))
        .with_behavior(Arc::new(ValidationBehavior));

    dispatcher.register::<CreateWishlist>(CreateWishlistHandler::new(store.clone()));
    dispatcher.register::<UpdateWishlist>(UpdateWishlistHandler::new(store.clone()));
    dispatcher.register::<DeleteWishlist>(DeleteWishlistHandler::new(store.clone(), blobs.clone()));
    dispatcher.register::<ReorderWishlists>(ReorderWishlistsHandler::new(store.clone()));
    dispatcher.register::<GetWishlists>(GetWishlistsHandler::new(store.clone()));
    dispatcher.register::<GetWishlist>(GetWishlistHandler::new(store.clone()));

    dispatcher.register::<CreateWishlistItem>(CreateWishlistItemHandler::new(store.clone()));
    dispatcher
        .register::<UpdateWishlistItem>(UpdateWishlistItemHandler::new(store.clone(), blobs.clone()));
    dispatcher
        .register::<DeleteWishlistItem>(DeleteWishlistItemHandler::new(store.clone(), blobs.clone()));
    dispatcher.register::<ReorderWishlistItems>(ReorderWishlistItemsHandler::new(store.clone()));
    dispatcher.register::<ToggleItemReservation>(ToggleItemReservationHandler::new(store.clone()));

    dispatcher.register::<GenerateShareLink>(GenerateShareLinkHandler::new(
        store.clone(),
        config.share_code_length,
    ));
    dispatcher.register::<GetSharedWishlist>(GetSharedWishlistHandler::new(store.clone()));
    dispatcher
        .register::<GetWishlistsSharedWithMe>(GetWishlistsSharedWithMeHandler::new(store.clone()));

    dispatcher.register::<RegisterUser>(RegisterUserHandler::new(store.clone()));
    dispatcher.register::<GetUserProfile>(GetUserProfileHandler::new(store.clone()));
    dispatcher
        .register::<UpdateUserProfile>(UpdateUserProfileHandler::new(store.clone(), blobs.clone()));
    dispatcher.register::<DeleteUser>(DeleteUserHandler::new(store, blobs));

    dispatcher
}
