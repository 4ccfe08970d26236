//! Chargeable weight and freight cost calculation.
//!
//! Freight is billed on the *chargeable weight*: the greater of the actual
//! cargo weight and its volumetric weight, where one cubic metre counts as
//! [`VOLUMETRIC_KG_PER_CBM`] kilograms.
//!
//! The cost then depends on the shipping method's rate type:
//!
//! - `per_kg`: `chargeable_weight * rate`
//! - `per_cbm`: `volume * rate`
//! - unknown (the method could not be resolved): `chargeable_weight * rate`,
//!   reported as [`PricingBasis::DefaultPerKg`] so the caller can tell an
//!   approximate cost from an exact one.
//!
//! Missing measurements never raise an error. They produce
//! [`CostOutcome::Insufficient`], naming what was missing.
//!
//! Everything here is pure: no I/O, no logging. Callers emit the diagnostic
//! events.
//!
//! ```rust
//! use engine::{PricingBasis, PricingInput, RateType};
//! use rust_decimal::Decimal;
//!
//! let input = PricingInput::new(
//!     Some(Decimal::new(10, 0)),
//!     Some(Decimal::new(1, 1)),
//!     Some(Decimal::new(125, 1)),
//!     Some(RateType::PerKg),
//! )
//! .unwrap();
//! let result = input.compute();
//! assert_eq!(result.chargeable_weight_kg, Some(Decimal::new(166, 1)));
//! assert_eq!(result.total_cost(), Some(Decimal::new(2075, 1)));
//! assert_eq!(result.basis(), Some(PricingBasis::PerKg));
//! ```
use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Kilograms billed per cubic metre of cargo (standard freight density).
pub const VOLUMETRIC_KG_PER_CBM: Decimal = Decimal::from_parts(166, 0, 0, false, 0);

/// Fraction digits kept on a total cost.
const COST_DECIMALS: u32 = 2;

/// Pricing basis of a shipping method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    PerKg,
    PerCbm,
}

impl RateType {
    /// Canonical string used by the database and the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerKg => "per_kg",
            Self::PerCbm => "per_cbm",
        }
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "per_kg" => Ok(Self::PerKg),
            "per_cbm" => Ok(Self::PerCbm),
            other => Err(EngineError::InvalidRate(format!(
                "unknown rate type: {other}"
            ))),
        }
    }
}

/// How a total cost was derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingBasis {
    PerKg,
    PerCbm,
    /// No rate type was available, the cost was computed per kg.
    DefaultPerKg,
}

impl PricingBasis {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerKg => "per_kg",
            Self::PerCbm => "per_cbm",
            Self::DefaultPerKg => "default_per_kg",
        }
    }

    /// Returns `true` when the cost came from the per-kg fallback.
    #[must_use]
    pub const fn is_fallback(self) -> bool {
        matches!(self, Self::DefaultPerKg)
    }
}

impl FromStr for PricingBasis {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "per_kg" => Ok(Self::PerKg),
            "per_cbm" => Ok(Self::PerCbm),
            "default_per_kg" => Ok(Self::DefaultPerKg),
            other => Err(EngineError::InvalidRate(format!(
                "unknown pricing basis: {other}"
            ))),
        }
    }
}

/// The input a cost could not be computed without.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingInput {
    ChargeableWeight,
    Rate,
    Volume,
}

impl MissingInput {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChargeableWeight => "chargeable_weight",
            Self::Rate => "rate",
            Self::Volume => "volume",
        }
    }
}

impl FromStr for MissingInput {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "chargeable_weight" => Ok(Self::ChargeableWeight),
            "rate" => Ok(Self::Rate),
            "volume" => Ok(Self::Volume),
            other => Err(EngineError::InvalidInput(format!(
                "unknown missing input: {other}"
            ))),
        }
    }
}

/// Result of the cost calculation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CostOutcome {
    Computed { total: Decimal, basis: PricingBasis },
    Insufficient(MissingInput),
}

impl CostOutcome {
    #[must_use]
    pub const fn total(&self) -> Option<Decimal> {
        match self {
            Self::Computed { total, .. } => Some(*total),
            Self::Insufficient(_) => None,
        }
    }

    #[must_use]
    pub const fn basis(&self) -> Option<PricingBasis> {
        match self {
            Self::Computed { basis, .. } => Some(*basis),
            Self::Insufficient(_) => None,
        }
    }

    #[must_use]
    pub const fn missing(&self) -> Option<MissingInput> {
        match self {
            Self::Computed { .. } => None,
            Self::Insufficient(missing) => Some(*missing),
        }
    }
}

/// Cargo measurements plus the rate snapshot they are priced with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PricingInput {
    pub actual_weight_kg: Option<Decimal>,
    pub volume_cbm: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub rate_type: Option<RateType>,
}

impl PricingInput {
    /// Builds a validated input. Weight, volume and rate must not be
    /// negative.
    pub fn new(
        actual_weight_kg: Option<Decimal>,
        volume_cbm: Option<Decimal>,
        rate: Option<Decimal>,
        rate_type: Option<RateType>,
    ) -> ResultEngine<Self> {
        ensure_not_negative(actual_weight_kg, "actual weight")
            .map_err(EngineError::InvalidMeasurement)?;
        ensure_not_negative(volume_cbm, "volume").map_err(EngineError::InvalidMeasurement)?;
        ensure_not_negative(rate, "rate").map_err(EngineError::InvalidRate)?;
        Ok(Self {
            actual_weight_kg,
            volume_cbm,
            rate,
            rate_type,
        })
    }

    /// Computes chargeable weight and total cost.
    #[must_use]
    pub fn compute(&self) -> PricingResult {
        let chargeable_weight_kg = chargeable_weight(self.actual_weight_kg, self.volume_cbm);
        let cost = total_cost(
            chargeable_weight_kg,
            self.volume_cbm,
            self.rate,
            self.rate_type,
        );
        PricingResult {
            chargeable_weight_kg,
            cost,
        }
    }
}

fn ensure_not_negative(value: Option<Decimal>, label: &str) -> Result<(), String> {
    match value {
        Some(value) if value < Decimal::ZERO => Err(format!("{label} must be >= 0")),
        _ => Ok(()),
    }
}

/// Pricing fields derived from a [`PricingInput`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PricingResult {
    pub chargeable_weight_kg: Option<Decimal>,
    pub cost: CostOutcome,
}

impl PricingResult {
    #[must_use]
    pub const fn total_cost(&self) -> Option<Decimal> {
        self.cost.total()
    }

    #[must_use]
    pub const fn basis(&self) -> Option<PricingBasis> {
        self.cost.basis()
    }

    /// `true` when the cost was computed without a known rate type.
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.basis().is_some_and(PricingBasis::is_fallback)
    }
}

/// Greater of actual and volumetric weight.
///
/// Volume alone does not produce a chargeable weight: without an actual
/// weight the result is `None`.
#[must_use]
pub fn chargeable_weight(
    actual_weight_kg: Option<Decimal>,
    volume_cbm: Option<Decimal>,
) -> Option<Decimal> {
    match (actual_weight_kg, volume_cbm) {
        (Some(actual), Some(volume)) => Some(actual.max(volume * VOLUMETRIC_KG_PER_CBM)),
        (Some(actual), None) => Some(actual),
        (None, _) => None,
    }
}

/// Total cost for a chargeable weight under the given rate rule.
#[must_use]
pub fn total_cost(
    chargeable_weight_kg: Option<Decimal>,
    volume_cbm: Option<Decimal>,
    rate: Option<Decimal>,
    rate_type: Option<RateType>,
) -> CostOutcome {
    let Some(chargeable) = chargeable_weight_kg else {
        return CostOutcome::Insufficient(MissingInput::ChargeableWeight);
    };
    let Some(rate) = rate else {
        return CostOutcome::Insufficient(MissingInput::Rate);
    };

    let (raw, basis) = match rate_type {
        Some(RateType::PerKg) => (chargeable * rate, PricingBasis::PerKg),
        Some(RateType::PerCbm) => match volume_cbm {
            Some(volume) => (volume * rate, PricingBasis::PerCbm),
            None => return CostOutcome::Insufficient(MissingInput::Volume),
        },
        None => (chargeable * rate, PricingBasis::DefaultPerKg),
    };

    CostOutcome::Computed {
        total: raw.round_dp_with_strategy(COST_DECIMALS, RoundingStrategy::MidpointAwayFromZero),
        basis,
    }
}

/// A record carrying its own pricing snapshot.
///
/// `recalculate` is compute-and-store: it prices the record from its stored
/// measurements and rate snapshot, writes the derived fields back and
/// returns the result.
pub trait Priced {
    fn pricing_input(&self) -> PricingInput;

    fn store_pricing(&mut self, result: &PricingResult);

    fn recalculate(&mut self) -> PricingResult {
        let result = self.pricing_input().compute();
        self.store_pricing(&result);
        result
    }
}

/// Storage columns (`total_cost`, `pricing_basis`, `pricing_missing`) for a
/// cost outcome.
pub(crate) fn cost_columns(
    cost: Option<&CostOutcome>,
) -> (Option<String>, Option<String>, Option<String>) {
    match cost {
        Some(CostOutcome::Computed { total, basis }) => (
            decimal_column(Some(*total)),
            Some(basis.as_str().to_string()),
            None,
        ),
        Some(CostOutcome::Insufficient(missing)) => {
            (None, None, Some(missing.as_str().to_string()))
        }
        None => (None, None, None),
    }
}

/// Rebuilds a cost outcome from its storage columns. `None` means the record
/// was never priced.
pub(crate) fn cost_from_columns(
    total: Option<&str>,
    basis: Option<&str>,
    missing: Option<&str>,
) -> ResultEngine<Option<CostOutcome>> {
    let total = decimal_from_column(total, "total_cost")?;
    match (total, basis, missing) {
        (Some(total), Some(basis), _) => Ok(Some(CostOutcome::Computed {
            total,
            basis: basis.parse()?,
        })),
        (_, _, Some(missing)) => Ok(Some(CostOutcome::Insufficient(missing.parse()?))),
        _ => Ok(None),
    }
}

/// Decimals are stored as text so the value and its scale survive storage.
pub(crate) fn decimal_column(value: Option<Decimal>) -> Option<String> {
    value.map(|value| value.to_string())
}

pub(crate) fn decimal_from_column(
    value: Option<&str>,
    column: &str,
) -> ResultEngine<Option<Decimal>> {
    value.map(|raw| parse_decimal_column(raw, column)).transpose()
}

pub(crate) fn parse_decimal_column(raw: &str, column: &str) -> ResultEngine<Decimal> {
    raw.trim().parse::<Decimal>().map_err(|err| {
        EngineError::InvalidInput(format!("stored {column} {raw:?} is not a decimal: {err}"))
    })
}
