use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record as persisted by a [`super::UserStore`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String, // login key, stored lower-cased
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub badges: Vec<String>,     // alpha-3 codes, append-only
    pub favourites: Vec<String>, // alpha-2 codes in practice
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn new(username: &str, email: &str, password_hash: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            badges: Vec::new(),
            favourites: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Union-insert. Returns `false` when the badge was already present.
    pub fn add_badge(&mut self, code: &str) -> bool {
        insert_unique(&mut self.badges, code)
    }

    pub fn add_favourite(&mut self, code: &str) -> bool {
        insert_unique(&mut self.favourites, code)
    }

    /// Returns `false` when the code was not a favourite.
    pub fn remove_favourite(&mut self, code: &str) -> bool {
        let before = self.favourites.len();
        self.favourites.retain(|c| c != code);
        self.favourites.len() != before
    }

    pub fn is_favourite(&self, code: &str) -> bool {
        self.favourites.iter().any(|c| c == code)
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            user_id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

fn insert_unique(set: &mut Vec<String>, code: &str) -> bool {
    if set.iter().any(|c| c == code) {
        return false;
    }
    set.push(code.to_string());
    true
}

/// Public projection of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badges_are_a_set() {
        let mut user = User::new("ada", "ada@example.com", "hash");
        assert!(user.add_badge("FRA"));
        assert!(!user.add_badge("FRA"));
        assert!(user.add_badge("JPN"));
        assert_eq!(user.badges, vec!["FRA", "JPN"]);
    }

    #[test]
    fn favourite_add_then_remove_restores_previous_state() {
        let mut user = User::new("ada", "ada@example.com", "hash");
        user.add_favourite("FR");
        let before = user.favourites.clone();

        assert!(user.add_favourite("JP"));
        assert!(user.is_favourite("JP"));
        assert!(user.remove_favourite("JP"));
        assert!(!user.remove_favourite("JP"));
        assert_eq!(user.favourites, before);
    }

    #[test]
    fn serialized_user_has_no_password_hash() {
        let user = User::new("ada", "ada@example.com", "$argon2id$secret");
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password_hash"));

        let public = serde_json::to_value(user.public()).unwrap();
        assert_eq!(public["username"], "ada");
        assert!(public.get("userId").is_some());
    }
}
