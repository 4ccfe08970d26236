use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-like currency code attached to a shipping method and copied onto
/// every quote or shipment priced with it.
///
/// The catalog mixes real ISO codes (`USD`) with local conventions (`KSH`),
/// so the engine only enforces the shape: three ASCII letters, stored
/// upper-cased.
///
/// ```rust
/// use engine::Currency;
///
/// let currency: Currency = " ksh ".parse().unwrap();
/// assert_eq!(currency.code(), "KSH");
/// assert!("US".parse::<Currency>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Currency used when a record carries no explicit code.
    pub const DEFAULT_CODE: &'static str = "USD";

    /// Canonical currency code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self(Self::DEFAULT_CODE.to_string())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(EngineError::InvalidCurrency(format!(
                "unsupported currency: {}",
                s.trim()
            )));
        }
        Ok(Self(code))
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for Currency {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}
