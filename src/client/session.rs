use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::ClientError;
use crate::auth::{AuthResponse, Claims};
use crate::users::PublicUser;

/// Signed-in state. Expiry is checked whenever the token is read, so an
/// expired session simply stops yielding a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    token: String,
    pub user: PublicUser,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl Session {
    /// Reads the expiry from the token payload. The signature is the server's
    /// business; the client cannot check it.
    pub fn from_auth(resp: AuthResponse) -> Result<Self, ClientError> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        let data = decode::<Claims>(&resp.access_token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| ClientError::BadToken(e.to_string()))?;
        let expires_at = OffsetDateTime::from_unix_timestamp(data.claims.exp as i64)
            .map_err(|e| ClientError::BadToken(e.to_string()))?;
        Ok(Self {
            token: resp.access_token,
            user: resp.user,
            expires_at,
        })
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    pub fn token(&self) -> Result<&str, ClientError> {
        if self.is_expired() {
            return Err(ClientError::SessionExpired);
        }
        Ok(&self.token)
    }
}
