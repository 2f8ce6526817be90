use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{OnceCell, RwLock};
use tracing::debug;

use super::{CountryError, CountryProvider, CountryRecord};

/// Memoises a provider. Country metadata is static, so entries never expire.
/// Failures are not cached.
pub struct CachedCountryProvider<P> {
    inner: P,
    by_identifier: RwLock<HashMap<String, CountryRecord>>,
    all: OnceCell<Vec<CountryRecord>>,
}

impl<P: CountryProvider> CachedCountryProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            by_identifier: RwLock::new(HashMap::new()),
            all: OnceCell::new(),
        }
    }

    fn key(identifier: &str) -> String {
        identifier.trim().to_lowercase()
    }
}

#[async_trait]
impl<P: CountryProvider> CountryProvider for CachedCountryProvider<P> {
    async fn fetch_country(&self, identifier: &str) -> Result<CountryRecord, CountryError> {
        let key = Self::key(identifier);
        if let Some(hit) = self.by_identifier.read().await.get(&key) {
            debug!(%key, "country cache hit");
            return Ok(hit.clone());
        }
        let record = self.inner.fetch_country(identifier).await?;
        self.by_identifier
            .write()
            .await
            .insert(key, record.clone());
        Ok(record)
    }

    async fn fetch_all_countries(&self) -> Result<Vec<CountryRecord>, CountryError> {
        self.all
            .get_or_try_init(|| self.inner.fetch_all_countries())
            .await
            .cloned()
    }
}
