//! Warehouses, offices and pick-up points.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, FreightMode};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarehouseKind {
    #[default]
    Warehouse,
    Office,
    PickupPoint,
}

impl WarehouseKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warehouse => "warehouse",
            Self::Office => "office",
            Self::PickupPoint => "pickup_point",
        }
    }
}

impl fmt::Display for WarehouseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WarehouseKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "warehouse" => Ok(Self::Warehouse),
            "office" => Ok(Self::Office),
            "pickup_point" => Ok(Self::PickupPoint),
            other => Err(EngineError::InvalidInput(format!(
                "unknown warehouse type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub kind: WarehouseKind,
    pub country: Option<String>,
    pub address_en: Option<String>,
    pub address_cn: Option<String>,
    pub phone_1: Option<String>,
    pub phone_2: Option<String>,
    pub email: Option<String>,
    /// Freight modes handled at this location.
    pub shipping_modes: Vec<FreightMode>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Warehouse {
    #[must_use]
    pub fn handles(&self, mode: FreightMode) -> bool {
        self.shipping_modes.contains(&mode)
    }
}

#[derive(Clone, Debug, Default)]
pub struct WarehouseNew {
    pub name: String,
    pub kind: WarehouseKind,
    pub country: Option<String>,
    pub address_en: Option<String>,
    pub address_cn: Option<String>,
    pub phone_1: Option<String>,
    pub phone_2: Option<String>,
    pub email: Option<String>,
    pub shipping_modes: Vec<FreightMode>,
}

/// `"air,sea"` column value, `None` for an empty set.
pub(crate) fn join_modes(modes: &[FreightMode]) -> Option<String> {
    if modes.is_empty() {
        return None;
    }
    let mut joined: Vec<&str> = Vec::with_capacity(modes.len());
    for mode in modes {
        if !joined.contains(&mode.as_str()) {
            joined.push(mode.as_str());
        }
    }
    Some(joined.join(","))
}

pub(crate) fn split_modes(value: Option<&str>) -> Result<Vec<FreightMode>, EngineError> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

impl TryFrom<Model> for Warehouse {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            name: value.name,
            kind: value.kind.parse()?,
            country: value.country,
            address_en: value.address_en,
            address_cn: value.address_cn,
            phone_1: value.phone_1,
            phone_2: value.phone_2,
            email: value.email,
            shipping_modes: split_modes(value.shipping_modes.as_deref())?,
            is_active: value.is_active,
            created_at: value.created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "warehouses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub country: Option<String>,
    pub address_en: Option<String>,
    pub address_cn: Option<String>,
    pub phone_1: Option<String>,
    pub phone_2: Option<String>,
    pub email: Option<String>,
    pub shipping_modes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Warehouse> for ActiveModel {
    fn from(value: &Warehouse) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            name: ActiveValue::Set(value.name.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            country: ActiveValue::Set(value.country.clone()),
            address_en: ActiveValue::Set(value.address_en.clone()),
            address_cn: ActiveValue::Set(value.address_cn.clone()),
            phone_1: ActiveValue::Set(value.phone_1.clone()),
            phone_2: ActiveValue::Set(value.phone_2.clone()),
            email: ActiveValue::Set(value.email.clone()),
            shipping_modes: ActiveValue::Set(join_modes(&value.shipping_modes)),
            is_active: ActiveValue::Set(value.is_active),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}
