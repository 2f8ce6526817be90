use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct AddBadgeRequest {
    #[serde(default)]
    pub badge: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavouriteRequest {
    #[serde(default)]
    pub country_code: String,
    /// Accepted for compatibility, not stored.
    #[serde(default)]
    pub country_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BadgesResponse {
    pub message: String,
    pub badges: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FavouritesResponse {
    pub message: String,
    pub favourites: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteStatus {
    pub is_favourite: bool,
}
