//! The module contains the errors the engine can throw.
//!
//! Pricing never fails a request on its own: missing measurements end up in
//! [`CostOutcome::Insufficient`] and an unresolved rate type is reported via
//! [`PricingBasis::DefaultPerKg`]. The only hard failure of the pricing core
//! is [`IdentifierExhausted`].
//!
//!  [`CostOutcome::Insufficient`]: crate::CostOutcome::Insufficient
//!  [`PricingBasis::DefaultPerKg`]: crate::PricingBasis::DefaultPerKg
//!  [`IdentifierExhausted`]: EngineError::IdentifierExhausted
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),
    #[error("Invalid rate: {0}")]
    InvalidRate(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Could not generate a unique {0}")]
    IdentifierExhausted(String),
    #[error("Password hashing failed: {0}")]
    Password(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidMeasurement(a), Self::InvalidMeasurement(b)) => a == b,
            (Self::InvalidRate(a), Self::InvalidRate(b)) => a == b,
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::IdentifierExhausted(a), Self::IdentifierExhausted(b)) => a == b,
            (Self::Password(a), Self::Password(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
