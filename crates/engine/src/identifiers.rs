//! Human-readable public identifiers for shipments and quotes.
//!
//! - tracking numbers: `RD` + 7 decimal digits
//! - quote numbers: `QT` + 8 characters from `[A-Z0-9]`
//!
//! Randomness comes from the OS CSPRNG. Uniqueness is owned by storage:
//! [`unique_identifier`] regenerates on collision, up to [`MAX_ATTEMPTS`].
use std::future::Future;

use rand::{Rng, rngs::OsRng};

use crate::{EngineError, ResultEngine};

/// Generation attempts before giving up with
/// [`EngineError::IdentifierExhausted`].
pub const MAX_ATTEMPTS: usize = 5;

const DIGITS: &[u8] = b"0123456789";
const UPPER_ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentifierKind {
    TrackingNumber,
    QuoteNumber,
}

impl IdentifierKind {
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::TrackingNumber => "RD",
            Self::QuoteNumber => "QT",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TrackingNumber => "tracking number",
            Self::QuoteNumber => "quote number",
        }
    }

    const fn alphabet(self) -> &'static [u8] {
        match self {
            Self::TrackingNumber => DIGITS,
            Self::QuoteNumber => UPPER_ALPHANUMERIC,
        }
    }

    const fn random_len(self) -> usize {
        match self {
            Self::TrackingNumber => 7,
            Self::QuoteNumber => 8,
        }
    }

    /// Generates a fresh candidate. Not checked for uniqueness.
    #[must_use]
    pub fn generate(self) -> String {
        let alphabet = self.alphabet();
        let mut rng = OsRng;
        let mut value = String::with_capacity(self.prefix().len() + self.random_len());
        value.push_str(self.prefix());
        for _ in 0..self.random_len() {
            value.push(char::from(alphabet[rng.gen_range(0..alphabet.len())]));
        }
        value
    }
}

#[must_use]
pub fn generate_tracking_number() -> String {
    IdentifierKind::TrackingNumber.generate()
}

#[must_use]
pub fn generate_quote_number() -> String {
    IdentifierKind::QuoteNumber.generate()
}

/// Generates identifiers until `is_taken` reports a free one.
///
/// Each collision is logged. After [`MAX_ATTEMPTS`] collisions the call
/// fails with [`EngineError::IdentifierExhausted`].
pub async fn unique_identifier<F, Fut>(kind: IdentifierKind, mut is_taken: F) -> ResultEngine<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ResultEngine<bool>>,
{
    for attempt in 1..=MAX_ATTEMPTS {
        let candidate = kind.generate();
        if !is_taken(candidate.clone()).await? {
            return Ok(candidate);
        }
        tracing::warn!(
            kind = kind.label(),
            attempt,
            candidate = %candidate,
            "identifier collision, regenerating"
        );
    }

    tracing::error!(kind = kind.label(), attempts = MAX_ATTEMPTS, "identifier space exhausted");
    Err(EngineError::IdentifierExhausted(kind.label().to_string()))
}
