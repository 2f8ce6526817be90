//! Badge and favourite collections of a single user.
//!
//! Badges are append-only: nothing here removes one. Favourites can be added
//! and removed freely. Both behave as sets, so repeated submissions are no-ops.

use tracing::{debug, info};
use uuid::Uuid;

use super::CountryCode;
use crate::{error::ApiError, users::UserStore};

pub async fn add_badge(
    store: &dyn UserStore,
    user_id: Uuid,
    code: &CountryCode,
) -> Result<Vec<String>, ApiError> {
    let user = store
        .add_badge(user_id, code.as_str())
        .await?
        .ok_or_else(ApiError::user_not_found)?;
    info!(%user_id, badge = %code, total = user.badges.len(), "badge recorded");
    Ok(user.badges)
}

pub async fn list_badges(store: &dyn UserStore, user_id: Uuid) -> Result<Vec<String>, ApiError> {
    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or_else(ApiError::user_not_found)?;
    Ok(user.badges)
}

pub async fn add_favourite(
    store: &dyn UserStore,
    user_id: Uuid,
    code: &CountryCode,
) -> Result<Vec<String>, ApiError> {
    let user = store
        .add_favourite(user_id, code.as_str())
        .await?
        .ok_or_else(ApiError::user_not_found)?;
    debug!(%user_id, favourite = %code, "favourite added");
    Ok(user.favourites)
}

pub async fn list_favourites(
    store: &dyn UserStore,
    user_id: Uuid,
) -> Result<Vec<String>, ApiError> {
    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or_else(ApiError::user_not_found)?;
    Ok(user.favourites)
}

pub async fn remove_favourite(
    store: &dyn UserStore,
    user_id: Uuid,
    code: &CountryCode,
) -> Result<Vec<String>, ApiError> {
    let user = store
        .remove_favourite(user_id, code.as_str())
        .await?
        .ok_or_else(ApiError::user_not_found)?;
    debug!(%user_id, favourite = %code, "favourite removed");
    Ok(user.favourites)
}

pub async fn is_favourite(
    store: &dyn UserStore,
    user_id: Uuid,
    code: &CountryCode,
) -> Result<bool, ApiError> {
    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or_else(ApiError::user_not_found)?;
    Ok(user.is_favourite(code.as_str()))
}
