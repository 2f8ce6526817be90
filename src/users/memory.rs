use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, User, UserStore};

/// Process-local store used when no database is configured, and by tests.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `f` to the stored user under a single write guard.
    async fn update<F>(&self, id: Uuid, f: F) -> Result<Option<User>, StoreError>
    where
        F: FnOnce(&mut User) -> bool + Send,
    {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            f(user);
            user.clone()
        }))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == username) {
            return Err(StoreError::DuplicateKey("username"));
        }
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::DuplicateKey("email"));
        }
        let user = User::new(username, email, password_hash);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| StoreError::Backend(anyhow::anyhow!("user {} does not exist", user.id)))?;
        for badge in &user.badges {
            stored.add_badge(badge);
        }
        stored.favourites = user.favourites.clone();
        Ok(())
    }

    async fn add_badge(&self, id: Uuid, code: &str) -> Result<Option<User>, StoreError> {
        self.update(id, |u| u.add_badge(code)).await
    }

    async fn add_favourite(&self, id: Uuid, code: &str) -> Result<Option<User>, StoreError> {
        self.update(id, |u| u.add_favourite(code)).await
    }

    async fn remove_favourite(&self, id: Uuid, code: &str) -> Result<Option<User>, StoreError> {
        self.update(id, |u| u.remove_favourite(code)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn create_rejects_duplicate_username_and_email() {
        let store = InMemoryUserStore::new();
        store.create_user("ada", "ada@example.com", "h").await.unwrap();

        let err = store.create_user("ada", "other@example.com", "h").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey("username")));

        let err = store.create_user("bob", "ada@example.com", "h").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey("email")));
    }

    #[tokio::test]
    async fn lookups_by_email_and_id() {
        let store = InMemoryUserStore::new();
        let created = store.create_user("ada", "ada@example.com", "h").await.unwrap();

        let by_email = store.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        let by_id = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "ada");

        assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn collection_helpers_are_idempotent() {
        let store = InMemoryUserStore::new();
        let user = store.create_user("ada", "ada@example.com", "h").await.unwrap();

        store.add_badge(user.id, "FRA").await.unwrap();
        let once = store.add_badge(user.id, "FRA").await.unwrap().unwrap();
        assert_eq!(once.badges, vec!["FRA"]);

        store.add_favourite(user.id, "FR").await.unwrap();
        let after = store.remove_favourite(user.id, "FR").await.unwrap().unwrap();
        assert!(after.favourites.is_empty());
        let again = store.remove_favourite(user.id, "FR").await.unwrap().unwrap();
        assert!(again.favourites.is_empty());

        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.badges, vec!["FRA"]);
    }

    #[tokio::test]
    async fn collection_helpers_report_missing_user() {
        let store = InMemoryUserStore::new();
        assert!(store.add_badge(Uuid::new_v4(), "FRA").await.unwrap().is_none());
        assert!(store.add_favourite(Uuid::new_v4(), "FR").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_keep_every_badge() {
        let store = Arc::new(InMemoryUserStore::new());
        let id = store.create_user("ada", "ada@example.com", "h").await.unwrap().id;

        let tasks: Vec<_> = (0..200)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.add_badge(id, &format!("B{i}")).await.unwrap();
                    store.add_favourite(id, &format!("F{i}")).await.unwrap();
                    store.remove_favourite(id, &format!("F{i}")).await.unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let stored = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.badges.len(), 200);
        assert!(stored.favourites.is_empty());
    }

    #[tokio::test]
    async fn save_with_stale_copy_never_drops_badges() {
        let store = InMemoryUserStore::new();
        let user = store.create_user("ada", "ada@example.com", "h").await.unwrap();
        let stale = store.find_by_id(user.id).await.unwrap().unwrap();

        store.add_badge(user.id, "FRA").await.unwrap();
        store.save(&stale).await.unwrap();

        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.badges, vec!["FRA"]);
    }
}
