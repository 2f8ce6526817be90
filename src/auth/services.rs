use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{AuthResponse, LoginRequest, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password, verify_password},
};
use crate::{error::ApiError, users::UserStore};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

lazy_static! {
    /// Verified against when the email is unknown, so both failures cost one argon2 run.
    static ref DUMMY_HASH: Option<String> = hash_password("nation-navigator-dummy").ok();
}

/// Runs a full verify and folds a malformed stored hash into a plain mismatch.
fn password_matches(plain: &str, hash: &str) -> bool {
    verify_password(plain, hash).unwrap_or_else(|e| {
        warn!(error = %e, "stored password hash is unreadable");
        false
    })
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates a user and signs a token for it.
pub async fn register(
    store: &dyn UserStore,
    keys: &JwtKeys,
    payload: RegisterRequest,
) -> Result<AuthResponse, ApiError> {
    let username = payload.username.trim();
    let email = normalize_email(&payload.email);

    if username.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Username, email and password are required".into(),
        ));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    if store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    // The store still enforces uniqueness, covering a concurrent registration.
    let user = store.create_user(username, &email, &hash).await?;
    let access_token = keys.sign(user.id)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(AuthResponse {
        user: user.public(),
        access_token,
    })
}

/// Unknown email and wrong password fail identically.
pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    payload: LoginRequest,
) -> Result<AuthResponse, ApiError> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Email and password are required".into()));
    }

    let Some(user) = store.find_by_email(&email).await? else {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            password_matches(&payload.password, dummy);
        }
        warn!(email = %email, "login unknown email");
        return Err(ApiError::Validation(INVALID_CREDENTIALS.into()));
    };

    if !password_matches(&payload.password, &user.password_hash) {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Validation(INVALID_CREDENTIALS.into()));
    }

    let access_token = keys.sign(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(AuthResponse {
        user: user.public(),
        access_token,
    })
}

/// Maps a bearer token to its user id. Missing, malformed, expired and
/// foreign-signed tokens all fail with `Unauthorized`.
pub fn verify_token(keys: &JwtKeys, token: &str) -> Result<Uuid, ApiError> {
    if token.is_empty() {
        return Err(ApiError::Unauthorized("No token provided".into()));
    }
    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "invalid or expired token");
        ApiError::Unauthorized("Invalid token".into())
    })?;
    Ok(claims.sub)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::config::AppConfig;
    use crate::users::InMemoryUserStore;

    fn keys() -> JwtKeys {
        JwtKeys::from(&AppConfig::fake().jwt)
    }

    fn register_req(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("ada@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada example@x.io"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test]
    async fn register_returns_token_that_maps_back_to_user() {
        let store = InMemoryUserStore::new();
        let keys = keys();
        let resp = register(&store, &keys, register_req("ada", " Ada@Example.com ", "pw"))
            .await
            .unwrap();
        assert_eq!(resp.user.email, "ada@example.com");

        let user_id = verify_token(&keys, &resp.access_token).unwrap();
        assert_eq!(user_id, resp.user.user_id);
    }

    #[tokio::test]
    async fn register_rejects_blank_fields_and_bad_email() {
        let store = InMemoryUserStore::new();
        let keys = keys();
        for req in [
            register_req("", "a@b.io", "pw"),
            register_req("ada", "", "pw"),
            register_req("ada", "a@b.io", ""),
            register_req("ada", "not-an-email", "pw"),
        ] {
            let err = register(&store, &keys, req).await.unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn register_rejects_taken_email_or_username() {
        let store = InMemoryUserStore::new();
        let keys = keys();
        register(&store, &keys, register_req("ada", "ada@example.com", "pw"))
            .await
            .unwrap();

        let err = register(&store, &keys, register_req("other", "ADA@example.com", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err = register(&store, &keys, register_req("ada", "new@example.com", "pw"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Username already exists");
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let store = InMemoryUserStore::new();
        let keys = keys();
        register(&store, &keys, register_req("ada", "ada@example.com", "right"))
            .await
            .unwrap();

        let ok = login(&store, &keys, login_req("ada@example.com", "right")).await.unwrap();
        assert_eq!(ok.user.username, "ada");

        let wrong_pw = login(&store, &keys, login_req("ada@example.com", "wrong"))
            .await
            .unwrap_err();
        let unknown = login(&store, &keys, login_req("bob@example.com", "right"))
            .await
            .unwrap_err();
        assert_eq!(wrong_pw.status(), unknown.status());
        assert_eq!(wrong_pw.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn unreadable_stored_hash_is_invalid_credentials() {
        let store = InMemoryUserStore::new();
        store
            .create_user("ada", "ada@example.com", "not-a-phc-string")
            .await
            .unwrap();

        let err = login(&store, &keys(), login_req("ada@example.com", "anything"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), INVALID_CREDENTIALS);
    }

    #[test]
    fn unknown_email_path_has_a_hash_to_verify_against() {
        let dummy = DUMMY_HASH.as_deref().expect("dummy hash");
        assert!(dummy.starts_with("$argon2"));
        assert!(!password_matches("right", dummy));
    }

    #[test]
    fn verify_token_rejects_missing_or_garbage_tokens() {
        let keys = keys();
        assert!(matches!(verify_token(&keys, ""), Err(ApiError::Unauthorized(_))));
        assert!(matches!(verify_token(&keys, "abc.def.ghi"), Err(ApiError::Unauthorized(_))));
    }
}
