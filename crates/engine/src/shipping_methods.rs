//! The shipping-method catalog.
//!
//! Methods are reference data. Quotes and shipments copy a [`RateSnapshot`]
//! when they are created, so later catalog edits never reprice history.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, RateType, pricing::parse_decimal_column};

/// Transport mode of a shipping method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreightMode {
    Air,
    Sea,
}

impl FreightMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Sea => "sea",
        }
    }
}

impl fmt::Display for FreightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FreightMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "air" => Ok(Self::Air),
            "sea" => Ok(Self::Sea),
            other => Err(EngineError::InvalidInput(format!(
                "unknown shipping type: {other}"
            ))),
        }
    }
}

/// Rate rule copied from a shipping method onto a priced record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateSnapshot {
    pub shipping_method_id: Uuid,
    pub rate_type: RateType,
    pub rate: Decimal,
    pub currency: Currency,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShippingMethod {
    pub id: Uuid,
    pub name: String,
    pub mode: FreightMode,
    pub origin: Option<String>,
    pub rate_type: RateType,
    pub base_rate: Decimal,
    pub currency: Currency,
    pub transit_days_min: Option<i32>,
    pub transit_days_max: Option<i32>,
    pub schedule: Option<String>,
    pub restrictions: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ShippingMethod {
    #[must_use]
    pub fn snapshot(&self) -> RateSnapshot {
        RateSnapshot {
            shipping_method_id: self.id,
            rate_type: self.rate_type,
            rate: self.base_rate,
            currency: self.currency.clone(),
        }
    }

    /// Human-readable transit window, e.g. `"3-5 days"`.
    #[must_use]
    pub fn transit_days(&self) -> Option<String> {
        match (self.transit_days_min, self.transit_days_max) {
            (Some(min), Some(max)) => Some(format!("{min}-{max} days")),
            _ => None,
        }
    }
}

/// Fields required to add a method to the catalog.
#[derive(Clone, Debug)]
pub struct ShippingMethodNew {
    pub name: String,
    pub mode: FreightMode,
    pub origin: Option<String>,
    pub rate_type: RateType,
    pub base_rate: Decimal,
    pub currency: Currency,
    pub transit_days_min: Option<i32>,
    pub transit_days_max: Option<i32>,
    pub schedule: Option<String>,
    pub restrictions: Option<String>,
}

impl TryFrom<Model> for ShippingMethod {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            name: value.name,
            mode: value.mode.parse()?,
            origin: value.origin,
            rate_type: value.rate_type.parse()?,
            base_rate: parse_decimal_column(&value.base_rate, "base_rate")?,
            currency: value.currency.parse()?,
            transit_days_min: value.transit_days_min,
            transit_days_max: value.transit_days_max,
            schedule: value.schedule,
            restrictions: value.restrictions,
            is_active: value.is_active,
            created_at: value.created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shipping_methods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub mode: String,
    pub origin: Option<String>,
    pub rate_type: String,
    #[sea_orm(column_type = "Text")]
    pub base_rate: String,
    pub currency: String,
    pub transit_days_min: Option<i32>,
    pub transit_days_max: Option<i32>,
    pub schedule: Option<String>,
    pub restrictions: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::quotes::Entity")]
    Quotes,
    #[sea_orm(has_many = "super::shipments::Entity")]
    Shipments,
}

impl Related<super::quotes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotes.def()
    }
}

impl Related<super::shipments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ShippingMethod> for ActiveModel {
    fn from(value: &ShippingMethod) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            name: ActiveValue::Set(value.name.clone()),
            mode: ActiveValue::Set(value.mode.as_str().to_string()),
            origin: ActiveValue::Set(value.origin.clone()),
            rate_type: ActiveValue::Set(value.rate_type.as_str().to_string()),
            base_rate: ActiveValue::Set(value.base_rate.to_string()),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            transit_days_min: ActiveValue::Set(value.transit_days_min),
            transit_days_max: ActiveValue::Set(value.transit_days_max),
            schedule: ActiveValue::Set(value.schedule.clone()),
            restrictions: ActiveValue::Set(value.restrictions.clone()),
            is_active: ActiveValue::Set(value.is_active),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn air() -> ShippingMethod {
        ShippingMethod {
            id: Uuid::new_v4(),
            name: "Direct Air (Guangzhou)".to_string(),
            mode: FreightMode::Air,
            origin: Some("Guangzhou".to_string()),
            rate_type: RateType::PerKg,
            base_rate: Decimal::new(1250, 2),
            currency: Currency::default(),
            transit_days_min: Some(3),
            transit_days_max: Some(5),
            schedule: Some("Daily departures".to_string()),
            restrictions: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn snapshot_copies_rate_rule() {
        let method = air();
        let snapshot = method.snapshot();
        assert_eq!(snapshot.shipping_method_id, method.id);
        assert_eq!(snapshot.rate_type, RateType::PerKg);
        assert_eq!(snapshot.rate, Decimal::new(1250, 2));
        assert_eq!(snapshot.currency.code(), "USD");
    }

    #[test]
    fn transit_days_needs_both_bounds() {
        let mut method = air();
        assert_eq!(method.transit_days().as_deref(), Some("3-5 days"));
        method.transit_days_max = None;
        assert_eq!(method.transit_days(), None);
    }

    #[test]
    fn freight_mode_parses_case_insensitively() {
        assert_eq!("AIR".parse::<FreightMode>().unwrap(), FreightMode::Air);
        assert_eq!("sea".parse::<FreightMode>().unwrap(), FreightMode::Sea);
        assert!("rail".parse::<FreightMode>().is_err());
    }
}
