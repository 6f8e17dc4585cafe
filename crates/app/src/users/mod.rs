//! User profile commands and queries.

mod delete;
mod get;
mod register;
mod update;

pub use delete::{DeleteUser, DeleteUserHandler};
pub use get::{GetUserProfile, GetUserProfileHandler};
pub use register::{RegisterUser, RegisterUserHandler};
pub use update::{UpdateUserProfile, UpdateUserProfileHandler};
