use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use thiserror::Error;
use tracing::{debug, warn};

use super::CountryRecord;

#[derive(Error, Debug)]
pub enum CountryError {
    #[error("country not found: {0}")]
    NotFound(String),

    /// The provider could not be reached or answered with garbage.
    #[error("country data provider unavailable: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait CountryProvider: Send + Sync {
    /// Looks a country up by common name or by alpha-2/alpha-3 code.
    async fn fetch_country(&self, identifier: &str) -> Result<CountryRecord, CountryError>;

    async fn fetch_all_countries(&self) -> Result<Vec<CountryRecord>, CountryError>;
}

/// Fields requested from `/all`; the endpoint refuses to answer without a list.
const ALL_FIELDS: &str =
    "name,capital,region,subregion,population,languages,currencies,flags,cca2,cca3";

pub const DEFAULT_BASE_URL: &str = "https://restcountries.com/v3.1";

#[derive(Clone)]
pub struct RestCountriesProvider {
    client: reqwest::Client,
    base_url: String,
}

impl Default for RestCountriesProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl RestCountriesProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, CountryError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CountryError::Upstream(format!("bad base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| CountryError::Upstream("base url cannot have a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_list(&self, url: Url, identifier: &str) -> Result<Vec<CountryRecord>, CountryError> {
        debug!(%url, "fetching country data");
        let res = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "country data request failed");
            CountryError::Upstream(e.to_string())
        })?;

        match res.status() {
            StatusCode::NOT_FOUND => return Err(CountryError::NotFound(identifier.to_string())),
            s if !s.is_success() => {
                warn!(status = %s, "country data provider error");
                return Err(CountryError::Upstream(format!("status {s}")));
            }
            _ => {}
        }

        res.json::<Vec<CountryRecord>>()
            .await
            .map_err(|e| CountryError::Upstream(format!("decode: {e}")))
    }
}

pub(crate) fn looks_like_code(identifier: &str) -> bool {
    (2..=3).contains(&identifier.len()) && identifier.chars().all(|c| c.is_ascii_alphabetic())
}

#[async_trait]
impl CountryProvider for RestCountriesProvider {
    async fn fetch_country(&self, identifier: &str) -> Result<CountryRecord, CountryError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(CountryError::NotFound(String::new()));
        }
        let url = if looks_like_code(identifier) {
            self.url(&["alpha", identifier])?
        } else {
            let mut url = self.url(&["name", identifier])?;
            url.query_pairs_mut().append_pair("fullText", "true");
            url
        };
        self.get_list(url, identifier)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CountryError::NotFound(identifier.to_string()))
    }

    async fn fetch_all_countries(&self) -> Result<Vec<CountryRecord>, CountryError> {
        let mut url = self.url(&["all"])?;
        url.query_pairs_mut().append_pair("fields", ALL_FIELDS);
        self.get_list(url, "all").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_name_and_code_urls() {
        let p = RestCountriesProvider::new(format!("{DEFAULT_BASE_URL}/"));
        let url = p.url(&["name", "United States"]).unwrap();
        assert_eq!(url.as_str(), "https://restcountries.com/v3.1/name/United%20States");
        let url = p.url(&["alpha", "fra"]).unwrap();
        assert_eq!(url.as_str(), "https://restcountries.com/v3.1/alpha/fra");
    }

    #[test]
    fn short_alphabetic_identifiers_are_codes() {
        assert!(looks_like_code("FR"));
        assert!(looks_like_code("fra"));
        assert!(!looks_like_code("Peru"));
        assert!(!looks_like_code("F1"));
    }

    #[tokio::test]
    async fn unreachable_provider_is_upstream_error() {
        // Nothing listens on the discard port.
        let p = RestCountriesProvider::new("http://127.0.0.1:9/v3.1");
        let err = p.fetch_all_countries().await.unwrap_err();
        assert!(matches!(err, CountryError::Upstream(_)));
    }
}
