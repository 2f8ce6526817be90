use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::User;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique field (`"username"` or `"email"`) is already taken.
    #[error("duplicate {0}")]
    DuplicateKey(&'static str),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistence for [`User`] documents.
///
/// Collection updates must be atomic per user: two concurrent calls for the
/// same id never lose each other's change. Each helper returns `Ok(None)` when
/// the id does not resolve to a user.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Persists the `badges` and `favourites` of an existing user. Badges are
    /// merged into what is stored, never dropped; favourites are replaced.
    async fn save(&self, user: &User) -> Result<(), StoreError>;

    async fn add_badge(&self, id: Uuid, code: &str) -> Result<Option<User>, StoreError>;

    async fn add_favourite(&self, id: Uuid, code: &str) -> Result<Option<User>, StoreError>;

    async fn remove_favourite(&self, id: Uuid, code: &str) -> Result<Option<User>, StoreError>;
}
