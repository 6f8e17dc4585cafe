//! Domain error types.

use thiserror::Error;

/// Errors raised by entity operations.
///
/// These cover only rules an entity can check against its own state.
/// Cross-entity rules (ownership, uniqueness, reservation exclusivity) are
/// enforced by handlers, which need repository lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WishlistError {
    /// A required text field was empty or blank.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A different user already holds the reservation on this item.
    #[error("item is reserved by another user")]
    ReservedByAnother,
}
