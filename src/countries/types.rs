use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One country as returned by the data provider. Everything except the name
/// is optional; consumers must cope with any field being absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub name: CountryName,
    #[serde(default)]
    pub capital: Option<Vec<String>>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub subregion: Option<String>,
    #[serde(default)]
    pub population: Option<u64>,
    #[serde(default)]
    pub languages: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub currencies: Option<BTreeMap<String, Currency>>,
    #[serde(default)]
    pub flags: Option<Flags>,
    #[serde(default, rename = "cca2")]
    pub alpha2: Option<String>,
    #[serde(default, rename = "cca3")]
    pub alpha3: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryName {
    pub common: String,
    #[serde(default)]
    pub official: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flags {
    #[serde(default)]
    pub svg: Option<String>,
    #[serde(default)]
    pub png: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

impl CountryRecord {
    pub fn common_name(&self) -> &str {
        &self.name.common
    }

    pub fn capital_city(&self) -> Option<&str> {
        self.capital.as_ref()?.first().and_then(|c| non_empty(c))
    }

    pub fn region_name(&self) -> Option<&str> {
        self.region.as_deref().and_then(non_empty)
    }

    /// Zero is treated as unknown.
    pub fn population_count(&self) -> Option<u64> {
        self.population.filter(|p| *p > 0)
    }

    /// Name of the first currency, ordered by ISO code.
    pub fn primary_currency(&self) -> Option<&str> {
        self.currencies
            .as_ref()?
            .values()
            .find_map(|c| c.name.as_deref().and_then(non_empty))
    }

    /// SVG flag, falling back to PNG.
    pub fn flag_image(&self) -> Option<&str> {
        let flags = self.flags.as_ref()?;
        flags
            .svg
            .as_deref()
            .and_then(non_empty)
            .or_else(|| flags.png.as_deref().and_then(non_empty))
    }

    /// Whether `other` describes the same country.
    pub fn same_country(&self, other: &CountryRecord) -> bool {
        match (&self.alpha3, &other.alpha3) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => self.name.common == other.name.common,
        }
    }
}
