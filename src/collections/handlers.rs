use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{
    dto::{AddBadgeRequest, AddFavouriteRequest, BadgesResponse, FavouriteStatus, FavouritesResponse},
    services, CountryCode,
};
use crate::{
    auth::AuthUser,
    error::ApiError,
    extract::{ApiJson, ApiPath},
    state::AppState,
};

pub fn badge_routes() -> Router<AppState> {
    Router::new().route("/:id/badges", post(add_badge).get(list_badges))
}

pub fn favourite_routes() -> Router<AppState> {
    Router::new()
        .route("/favourites", post(add_favourite).get(list_favourites))
        .route(
            "/favourites/:code",
            get(check_favourite).delete(remove_favourite),
        )
}

/// Badge routes name the user in the path; it has to be the caller.
fn ensure_owner(caller: Uuid, path_id: Uuid) -> Result<(), ApiError> {
    if caller != path_id {
        warn!(%caller, %path_id, "badge access to another user's document");
        return Err(ApiError::Forbidden(
            "Cannot access another user's badges".into(),
        ));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn add_badge(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<AddBadgeRequest>,
) -> Result<Json<BadgesResponse>, ApiError> {
    ensure_owner(user_id, id)?;
    let code = CountryCode::parse_badge(&payload.badge)?;
    let badges = services::add_badge(state.store.as_ref(), id, &code).await?;
    Ok(Json(BadgesResponse {
        message: "Badge added successfully".into(),
        badges,
    }))
}

#[instrument(skip(state))]
pub async fn list_badges(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<String>>, ApiError> {
    ensure_owner(user_id, id)?;
    Ok(Json(services::list_badges(state.store.as_ref(), id).await?))
}

#[instrument(skip(state, payload))]
pub async fn add_favourite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<AddFavouriteRequest>,
) -> Result<Json<FavouritesResponse>, ApiError> {
    let code = CountryCode::parse(&payload.country_code)?;
    let favourites = services::add_favourite(state.store.as_ref(), user_id, &code).await?;
    Ok(Json(FavouritesResponse {
        message: "Country added to favourites".into(),
        favourites,
    }))
}

#[instrument(skip(state))]
pub async fn list_favourites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(
        services::list_favourites(state.store.as_ref(), user_id).await?,
    ))
}

#[instrument(skip(state))]
pub async fn remove_favourite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(code): ApiPath<String>,
) -> Result<Json<FavouritesResponse>, ApiError> {
    let code = CountryCode::parse(&code)?;
    let favourites = services::remove_favourite(state.store.as_ref(), user_id, &code).await?;
    Ok(Json(FavouritesResponse {
        message: "Country removed from favourites".into(),
        favourites,
    }))
}

#[instrument(skip(state))]
pub async fn check_favourite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(code): ApiPath<String>,
) -> Result<Json<FavouriteStatus>, ApiError> {
    let code = CountryCode::parse(&code)?;
    let is_favourite = services::is_favourite(state.store.as_ref(), user_id, &code).await?;
    Ok(Json(FavouriteStatus { is_favourite }))
}
