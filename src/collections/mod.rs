mod code;
mod dto;
pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use code::CountryCode;
pub use dto::{AddBadgeRequest, AddFavouriteRequest, BadgesResponse, FavouriteStatus, FavouritesResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::badge_routes())
        .merge(handlers::favourite_routes())
}
