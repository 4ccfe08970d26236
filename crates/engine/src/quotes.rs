//! Freight quotes.
//!
//! A quote carries the cargo measurements, the rate snapshot taken from its
//! shipping method and the derived pricing fields.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    CostOutcome, Currency, EngineError, PricingInput, PricingResult, RateSnapshot, RateType,
    ResultEngine, ShippingMethod,
    pricing::{Priced, cost_columns, cost_from_columns, decimal_column, decimal_from_column},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Expired,
}

impl QuoteStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Accepted => "accepted",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "accepted" => Ok(Self::Accepted),
            "expired" => Ok(Self::Expired),
            other => Err(EngineError::InvalidInput(format!(
                "unknown quote status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quote {
    pub id: Uuid,
    /// `None` until the quote is persisted.
    pub quote_number: Option<String>,
    pub user_id: Option<Uuid>,
    pub shipping_method_id: Option<Uuid>,
    pub actual_weight_kg: Option<Decimal>,
    pub volume_cbm: Option<Decimal>,
    pub chargeable_weight_kg: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub rate_type: Option<RateType>,
    pub currency: Currency,
    /// `None` when the quote has never been priced.
    pub cost: Option<CostOutcome>,
    pub status: QuoteStatus,
    pub valid_until: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// A quote together with the method it was priced against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteDetails {
    pub quote: Quote,
    /// `None` once the method has been removed from the catalog.
    pub shipping_method: Option<ShippingMethod>,
}

impl Quote {
    /// Builds a priced, unsaved quote from a rate snapshot and cargo
    /// measurements.
    pub fn new(
        snapshot: &RateSnapshot,
        actual_weight_kg: Option<Decimal>,
        volume_cbm: Option<Decimal>,
    ) -> ResultEngine<Self> {
        let input = PricingInput::new(
            actual_weight_kg,
            volume_cbm,
            Some(snapshot.rate),
            Some(snapshot.rate_type),
        )?;

        let mut quote = Self {
            id: Uuid::new_v4(),
            quote_number: None,
            user_id: None,
            shipping_method_id: Some(snapshot.shipping_method_id),
            actual_weight_kg: input.actual_weight_kg,
            volume_cbm: input.volume_cbm,
            chargeable_weight_kg: None,
            rate: input.rate,
            rate_type: input.rate_type,
            currency: snapshot.currency.clone(),
            cost: None,
            status: QuoteStatus::Draft,
            valid_until: None,
            created_at: Utc::now(),
        };
        quote.recalculate();
        Ok(quote)
    }

    #[must_use]
    pub fn total_cost(&self) -> Option<Decimal> {
        self.cost.as_ref().and_then(CostOutcome::total)
    }

    /// Sets `valid_until` to `today + days`, or clears it when that date is
    /// out of range.
    pub fn set_validity(&mut self, today: NaiveDate, days: i64) {
        self.valid_until =
            Duration::try_days(days).and_then(|span| today.checked_add_signed(span));
    }

    /// A quote is expired once its validity date has passed or it was
    /// explicitly marked so.
    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.status == QuoteStatus::Expired || self.valid_until.is_some_and(|until| until < today)
    }

    /// The stored status, or `Expired` once the validity date has passed.
    #[must_use]
    pub fn status_on(&self, today: NaiveDate) -> QuoteStatus {
        if self.is_expired(today) {
            QuoteStatus::Expired
        } else {
            self.status
        }
    }
}

impl Priced for Quote {
    fn pricing_input(&self) -> PricingInput {
        PricingInput {
            actual_weight_kg: self.actual_weight_kg,
            volume_cbm: self.volume_cbm,
            rate: self.rate,
            rate_type: self.rate_type,
        }
    }

    fn store_pricing(&mut self, result: &PricingResult) {
        self.chargeable_weight_kg = result.chargeable_weight_kg;
        self.cost = Some(result.cost);
    }
}

impl TryFrom<Model> for Quote {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            quote_number: Some(value.quote_number),
            user_id: value.user_id,
            shipping_method_id: value.shipping_method_id,
            actual_weight_kg: decimal_from_column(value.actual_weight_kg.as_deref(), "actual_weight_kg")?,
            volume_cbm: decimal_from_column(value.volume_cbm.as_deref(), "volume_cbm")?,
            chargeable_weight_kg: decimal_from_column(value.chargeable_weight_kg.as_deref(), "chargeable_weight_kg")?,
            rate: decimal_from_column(value.rate.as_deref(), "rate")?,
            rate_type: value
                .rate_type
                .as_deref()
                .map(str::parse::<RateType>)
                .transpose()?,
            currency: value.currency.parse()?,
            cost: cost_from_columns(
                value.total_cost.as_deref(),
                value.pricing_basis.as_deref(),
                value.pricing_missing.as_deref(),
            )?,
            status: value.status.parse()?,
            valid_until: value.valid_until,
            created_at: value.created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quotes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub quote_number: String,
    pub user_id: Option<Uuid>,
    pub shipping_method_id: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub actual_weight_kg: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub volume_cbm: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub chargeable_weight_kg: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub rate: Option<String>,
    pub rate_type: Option<String>,
    pub currency: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub total_cost: Option<String>,
    pub pricing_basis: Option<String>,
    pub pricing_missing: Option<String>,
    pub status: String,
    pub valid_until: Option<Date>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::shipping_methods::Entity",
        from = "Column::ShippingMethodId",
        to = "super::shipping_methods::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    ShippingMethods,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::shipping_methods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShippingMethods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Quote> for ActiveModel {
    type Error = EngineError;

    fn try_from(value: &Quote) -> Result<Self, Self::Error> {
        let quote_number = value
            .quote_number
            .clone()
            .ok_or_else(|| EngineError::InvalidInput("quote number is missing".to_string()))?;
        let (total_cost, pricing_basis, pricing_missing) = cost_columns(value.cost.as_ref());

        Ok(Self {
            id: ActiveValue::Set(value.id),
            quote_number: ActiveValue::Set(quote_number),
            user_id: ActiveValue::Set(value.user_id),
            shipping_method_id: ActiveValue::Set(value.shipping_method_id),
            actual_weight_kg: ActiveValue::Set(decimal_column(value.actual_weight_kg)),
            volume_cbm: ActiveValue::Set(decimal_column(value.volume_cbm)),
            chargeable_weight_kg: ActiveValue::Set(decimal_column(value.chargeable_weight_kg)),
            rate: ActiveValue::Set(decimal_column(value.rate)),
            rate_type: ActiveValue::Set(value.rate_type.map(|r| r.as_str().to_string())),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            total_cost: ActiveValue::Set(total_cost),
            pricing_basis: ActiveValue::Set(pricing_basis),
            pricing_missing: ActiveValue::Set(pricing_missing),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            valid_until: ActiveValue::Set(value.valid_until),
            created_at: ActiveValue::Set(value.created_at),
        })
    }
}
