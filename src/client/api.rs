use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{ClientError, Session};
use crate::auth::{AuthResponse, MeResponse};
use crate::collections::{BadgesResponse, FavouriteStatus, FavouritesResponse};
use crate::quiz::BadgeAwarder;
use crate::users::PublicUser;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for `/api/users`. Holds the session obtained at login or
/// registration and attaches its bearer token to every protected call.
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: RwLock<Option<Session>>,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:9000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: RwLock::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/users{}", self.base_url, path)
    }

    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, ClientError> {
        let req = self.http.post(self.url("/register")).json(&json!({
            "username": username,
            "email": email,
            "password": password,
        }));
        let resp: AuthResponse = self.send(req).await?;
        self.start_session(resp).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<PublicUser, ClientError> {
        let req = self
            .http
            .post(self.url("/login"))
            .json(&json!({ "email": email, "password": password }));
        let resp: AuthResponse = self.send(req).await?;
        self.start_session(resp).await
    }

    /// Forgets the session locally. Tokens are stateless, so there is no
    /// server call to make.
    pub async fn logout(&self) {
        self.session.write().await.take();
    }

    pub async fn me(&self) -> Result<PublicUser, ClientError> {
        let resp: MeResponse = self.authed(Method::GET, "/me", None).await?;
        Ok(resp.user)
    }

    pub async fn add_badge(&self, code: &str) -> Result<Vec<String>, ClientError> {
        let user_id = self.user_id().await?;
        let resp: BadgesResponse = self
            .authed(
                Method::POST,
                &format!("/{user_id}/badges"),
                Some(json!({ "badge": code })),
            )
            .await?;
        Ok(resp.badges)
    }

    pub async fn list_badges(&self) -> Result<Vec<String>, ClientError> {
        let user_id = self.user_id().await?;
        self.authed(Method::GET, &format!("/{user_id}/badges"), None)
            .await
    }

    pub async fn add_favourite(&self, code: &str) -> Result<Vec<String>, ClientError> {
        let resp: FavouritesResponse = self
            .authed(
                Method::POST,
                "/favourites",
                Some(json!({ "countryCode": code })),
            )
            .await?;
        Ok(resp.favourites)
    }

    pub async fn list_favourites(&self) -> Result<Vec<String>, ClientError> {
        self.authed(Method::GET, "/favourites", None).await
    }

    pub async fn remove_favourite(&self, code: &str) -> Result<Vec<String>, ClientError> {
        let resp: FavouritesResponse = self
            .authed(Method::DELETE, &format!("/favourites/{code}"), None)
            .await?;
        Ok(resp.favourites)
    }

    pub async fn is_favourite(&self, code: &str) -> Result<bool, ClientError> {
        let resp: FavouriteStatus = self
            .authed(Method::GET, &format!("/favourites/{code}"), None)
            .await?;
        Ok(resp.is_favourite)
    }

    async fn start_session(&self, resp: AuthResponse) -> Result<PublicUser, ClientError> {
        let session = Session::from_auth(resp)?;
        let user = session.user.clone();
        debug!(user_id = %user.user_id, expires_at = %session.expires_at, "session started");
        *self.session.write().await = Some(session);
        Ok(user)
    }

    async fn user_id(&self) -> Result<Uuid, ClientError> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(ClientError::NotLoggedIn)?;
        Ok(session.user.user_id)
    }

    async fn authed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ClientError> {
        let token = {
            let guard = self.session.read().await;
            let session = guard.as_ref().ok_or(ClientError::NotLoggedIn)?;
            session.token()?.to_string()
        };
        let mut req = self.http.request(method, self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        match self.send(req).await {
            Err(ClientError::Api { status, message }) if status == reqwest::StatusCode::UNAUTHORIZED => {
                warn!(%message, "server rejected session");
                self.logout().await;
                Err(ClientError::Api { status, message })
            }
            other => other,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let res = req.send().await?;
        let status = res.status();
        if !status.is_success() {
            let message = match res.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
            };
            return Err(ClientError::Api { status, message });
        }
        Ok(res.json::<T>().await?)
    }
}

#[async_trait]
impl BadgeAwarder for ApiClient {
    async fn award_badge(&self, code: &str) -> anyhow::Result<()> {
        self.add_badge(code).await?;
        Ok(())
    }
}
