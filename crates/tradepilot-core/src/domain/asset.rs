use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_ASSET_LEN: usize = 64;

/// Normalized asset identifier, e.g. a CoinGecko coin id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetSymbol(String);

impl AssetSymbol {
    /// Parse and normalize an asset identifier to lowercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyAssetSymbol);
        }

        let normalized = trimmed.to_ascii_lowercase();
        let len = normalized.chars().count();
        if len > MAX_ASSET_LEN {
            return Err(ValidationError::AssetSymbolTooLong {
                len,
                max: MAX_ASSET_LEN,
            });
        }

        if let Some(first) = normalized.chars().next() {
            if !first.is_ascii_alphabetic() {
                return Err(ValidationError::AssetSymbolInvalidStart { ch: first });
            }
        }

        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.');
            if !valid {
                return Err(ValidationError::AssetSymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AssetSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for AssetSymbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for AssetSymbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<AssetSymbol> for String {
    fn from(value: AssetSymbol) -> Self {
        value.0
    }
}

/// Currency that spot prices and forecasts are denominated in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuoteCurrency(String);

impl QuoteCurrency {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_lowercase();
        let len = normalized.len();
        let valid = (3..=5).contains(&len) && normalized.chars().all(|ch| ch.is_ascii_lowercase());
        if !valid {
            return Err(ValidationError::InvalidQuoteCurrency {
                value: input.to_owned(),
            });
        }
        Ok(Self(normalized))
    }

    pub fn usd() -> Self {
        Self(String::from("usd"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for QuoteCurrency {
    fn default() -> Self {
        Self::usd()
    }
}

impl Display for QuoteCurrency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for QuoteCurrency {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<QuoteCurrency> for String {
    fn from(value: QuoteCurrency) -> Self {
        value.0
    }
}
