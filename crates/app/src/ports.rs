//! Contracts for external collaborators.
//!
//! The core depends on these traits only; production adapters (an OIDC
//! verifier, an object store) live outside this workspace. The in-memory
//! implementations here back tests and local runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use common::UserId;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::error::AppError;

/// The resolved identity behind a bearer credential.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
}

/// Authentication failure.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credential rejected")]
    Rejected,
}

/// Resolves an opaque bearer credential to a stable external user identity.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, bearer: &str) -> Result<Principal, AuthError>;
}

/// Fixed token table for tests and local runs.
#[derive(Default)]
pub struct StaticIdentityVerifier {
    tokens: HashMap<String, Principal>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token to the table.
    pub fn with_token(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.tokens.insert(token.into(), principal);
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, bearer: &str) -> Result<Principal, AuthError> {
        self.tokens.get(bearer).cloned().ok_or(AuthError::Rejected)
    }
}

/// An image payload accepted by upload commands.
#[derive(Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Blob store failure.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("blob store unavailable: {0}")]
    Unavailable(String),
}

impl From<BlobError> for AppError {
    fn from(err: BlobError) -> Self {
        AppError::Unexpected(err.to_string())
    }
}

/// Stores image bytes and hands back an opaque public reference.
///
/// The core holds only the reference string; bytes exist in memory just for
/// the duration of the handler call that uploads them.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores the bytes, returning the public reference.
    async fn put(&self, filename: &str, bytes: Vec<u8>) -> Result<String, BlobError>;

    /// Deletes the object behind a reference.
    async fn delete(&self, reference: &str) -> Result<(), BlobError>;
}

/// In-memory blob store for tests and local runs.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    next_id: AtomicU64,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored blobs.
    pub async fn blob_count(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Returns true if the reference resolves to a stored blob.
    pub async fn contains(&self, reference: &str) -> bool {
        self.blobs.read().await.contains_key(reference)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, filename: &str, bytes: Vec<u8>) -> Result<String, BlobError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let reference = format!("blob://{id}/{filename}");
        self.blobs.write().await.insert(reference.clone(), bytes);
        Ok(reference)
    }

    async fn delete(&self, reference: &str) -> Result<(), BlobError> {
        match self.blobs.write().await.remove(reference) {
            Some(_) => Ok(()),
            None => Err(BlobError::NotFound(reference.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_verifier_resolves_known_tokens() {
        let verifier = StaticIdentityVerifier::new().with_token(
            "token-1",
            Principal {
                user_id: UserId::new("auth|1"),
                username: "alice".into(),
                email: "alice@example.com".into(),
            },
        );

        let principal = verifier.verify("token-1").await.unwrap();
        assert_eq!(principal.user_id.as_str(), "auth|1");

        assert!(matches!(
            verifier.verify("other").await,
            Err(AuthError::Rejected)
        ));
    }

    #[tokio::test]
    async fn blob_store_roundtrip() {
        let store = MemoryBlobStore::new();

        let reference = store.put("gift.png", vec![1, 2, 3]).await.unwrap();
        assert!(reference.starts_with("blob://"));
        assert!(reference.ends_with("/gift.png"));
        assert!(store.contains(&reference).await);

        store.delete(&reference).await.unwrap();
        assert!(!store.contains(&reference).await);

        assert!(matches!(
            store.delete(&reference).await,
            Err(BlobError::NotFound(_))
        ));
    }

    #[test]
    fn image_upload_debug_hides_bytes() {
        let upload = ImageUpload {
            filename: "gift.png".into(),
            bytes: vec![0; 4096],
        };
        let printed = format!("{upload:?}");
        assert!(printed.contains("4096"));
        assert!(!printed.contains("0, 0, 0"));
    }
}
