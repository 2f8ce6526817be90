use std::fmt;

use crate::error::ApiError;

/// ISO 3166 alpha-2 or alpha-3 code, upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let code = raw.trim();
        if !(2..=3).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ApiError::Validation(format!(
                "Invalid country code: {raw:?}"
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Badges are earned per country and always use the alpha-3 code.
    pub fn parse_badge(raw: &str) -> Result<Self, ApiError> {
        let code = Self::parse(raw)?;
        if code.0.len() != 3 {
            return Err(ApiError::Validation(format!(
                "Badge must be a 3-letter country code: {raw:?}"
            )));
        }
        Ok(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
