//! Country data from an external provider (REST Countries by default).

mod cache;
mod provider;
mod types;

pub use cache::CachedCountryProvider;
pub use provider::{CountryError, CountryProvider, RestCountriesProvider, DEFAULT_BASE_URL};
pub use types::{CountryName, CountryRecord, Currency, Flags};
