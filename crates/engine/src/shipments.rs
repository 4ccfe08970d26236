//! Shipments and their priced cargo.
//!
//! A shipment prices itself from the measurements and rate snapshot it
//! carries. When the shipping method cannot be resolved at creation the
//! shipment keeps an explicit rate without a rate type and is priced with
//! the per-kg fallback.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{
    CostOutcome, Currency, EngineError, PricingInput, PricingResult, RateSnapshot, RateType,
    ResultEngine, ShippingMethod, TrackingEvent, TrackingEventNew,
    pricing::{Priced, cost_columns, cost_from_columns, decimal_column, decimal_from_column},
    validation::{normalize_optional_text, normalize_required},
};

/// Status given to a shipment created without one.
pub const DEFAULT_STATUS: &str = "pending";

/// Status that stamps `actual_delivery`.
pub const DELIVERED_STATUS: &str = "delivered";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shipment {
    pub id: Uuid,
    pub tracking_number: String,
    pub user_id: Option<Uuid>,
    pub shipping_method_id: Option<Uuid>,
    pub consignment_number: Option<String>,
    pub description: Option<String>,
    pub cartons: Option<i32>,
    pub actual_weight_kg: Option<Decimal>,
    pub volume_cbm: Option<Decimal>,
    pub chargeable_weight_kg: Option<Decimal>,
    pub rate: Option<Decimal>,
    /// `None` when the shipping method was not resolved.
    pub rate_type: Option<RateType>,
    pub currency: Currency,
    pub cost: Option<CostOutcome>,
    pub current_status: String,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub estimated_delivery: Option<NaiveDate>,
    pub actual_delivery: Option<NaiveDate>,
}

/// Fields used to register a shipment.
#[derive(Clone, Debug, Default)]
pub struct ShipmentNew {
    pub user_id: Option<Uuid>,
    pub shipping_method_id: Option<Uuid>,
    pub consignment_number: Option<String>,
    pub description: Option<String>,
    pub cartons: Option<i32>,
    pub actual_weight_kg: Option<Decimal>,
    pub volume_cbm: Option<Decimal>,
    /// Overrides the method's base rate. Required to price a shipment whose
    /// method is unknown.
    pub rate: Option<Decimal>,
    pub currency: Option<Currency>,
    pub current_status: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub estimated_delivery: Option<NaiveDate>,
}

/// Cargo changes. `None` leaves a field untouched.
#[derive(Clone, Debug, Default)]
pub struct CargoUpdate {
    pub actual_weight_kg: Option<Decimal>,
    pub volume_cbm: Option<Decimal>,
    pub cartons: Option<i32>,
    pub description: Option<String>,
    pub consignment_number: Option<String>,
}

impl CargoUpdate {
    /// `true` when the update touches a pricing input.
    #[must_use]
    pub const fn changes_measurements(&self) -> bool {
        self.actual_weight_kg.is_some() || self.volume_cbm.is_some()
    }
}

/// A status change and/or a tracking event to append.
#[derive(Clone, Debug, Default)]
pub struct StatusUpdate {
    pub status: Option<String>,
    pub event: Option<TrackingEventNew>,
}

#[derive(Clone, Debug, Default)]
pub struct ShipmentFilter {
    pub user_id: Option<Uuid>,
    pub status: Option<String>,
}

/// A shipment together with its method and tracking history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShipmentDetails {
    pub shipment: Shipment,
    pub shipping_method: Option<ShippingMethod>,
    /// Oldest first.
    pub events: Vec<TrackingEvent>,
}

impl Shipment {
    /// Builds a priced, unsaved shipment.
    ///
    /// With a snapshot the method's rate type and currency are copied; an
    /// explicit `rate` in `new` still overrides the base rate. Without one
    /// the shipment has no rate type and prices per kg.
    pub fn new(
        tracking_number: String,
        new: &ShipmentNew,
        snapshot: Option<&RateSnapshot>,
    ) -> ResultEngine<Self> {
        let rate = new.rate.or(snapshot.map(|s| s.rate));
        let rate_type = snapshot.map(|s| s.rate_type);
        let input = PricingInput::new(new.actual_weight_kg, new.volume_cbm, rate, rate_type)?;

        let currency = match (&new.currency, snapshot) {
            (Some(currency), _) => currency.clone(),
            (None, Some(snapshot)) => snapshot.currency.clone(),
            (None, None) => Currency::default(),
        };
        let current_status = match new.current_status.as_deref() {
            Some(status) => normalize_required(status, "status")?,
            None => DEFAULT_STATUS.to_string(),
        };
        if new.cartons.is_some_and(|cartons| cartons < 0) {
            return Err(EngineError::InvalidMeasurement(
                "cartons must be >= 0".to_string(),
            ));
        }

        let now = Utc::now();
        let mut shipment = Self {
            id: Uuid::new_v4(),
            tracking_number,
            user_id: new.user_id,
            shipping_method_id: snapshot.map(|s| s.shipping_method_id),
            consignment_number: normalize_optional_text(new.consignment_number.as_deref()),
            description: normalize_optional_text(new.description.as_deref()),
            cartons: new.cartons,
            actual_weight_kg: input.actual_weight_kg,
            volume_cbm: input.volume_cbm,
            chargeable_weight_kg: None,
            rate: input.rate,
            rate_type: input.rate_type,
            currency,
            cost: None,
            current_status,
            origin: normalize_optional_text(new.origin.as_deref()),
            destination: normalize_optional_text(new.destination.as_deref()),
            created_at: now,
            updated_at: now,
            estimated_delivery: new.estimated_delivery,
            actual_delivery: None,
        };
        shipment.recalculate();
        Ok(shipment)
    }

    #[must_use]
    pub fn total_cost(&self) -> Option<Decimal> {
        self.cost.as_ref().and_then(CostOutcome::total)
    }

    /// Applies cargo changes and reprices from the stored snapshot.
    pub fn apply_cargo(&mut self, update: &CargoUpdate) -> ResultEngine<PricingResult> {
        let input = PricingInput::new(
            update.actual_weight_kg.or(self.actual_weight_kg),
            update.volume_cbm.or(self.volume_cbm),
            self.rate,
            self.rate_type,
        )?;
        if update.cartons.is_some_and(|cartons| cartons < 0) {
            return Err(EngineError::InvalidMeasurement(
                "cartons must be >= 0".to_string(),
            ));
        }

        self.actual_weight_kg = input.actual_weight_kg;
        self.volume_cbm = input.volume_cbm;
        if update.cartons.is_some() {
            self.cartons = update.cartons;
        }
        if let Some(description) = update.description.as_deref() {
            self.description = normalize_optional_text(Some(description));
        }
        if let Some(consignment) = update.consignment_number.as_deref() {
            self.consignment_number = normalize_optional_text(Some(consignment));
        }
        self.updated_at = Utc::now();
        Ok(self.recalculate())
    }

    /// Sets a new status. Delivering a shipment stamps `actual_delivery`.
    pub fn set_status(&mut self, status: &str, today: NaiveDate) -> ResultEngine<()> {
        let status = normalize_required(status, "status")?;
        if status.eq_ignore_ascii_case(DELIVERED_STATUS) && self.actual_delivery.is_none() {
            self.actual_delivery = Some(today);
        }
        self.current_status = status;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Priced for Shipment {
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

impl TryFrom<Model> for Shipment {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            tracking_number: value.tracking_number,
            user_id: value.user_id,
            shipping_method_id: value.shipping_method_id,
            consignment_number: value.consignment_number,
            description: value.description,
            cartons: value.cartons,
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
            current_status: value.current_status,
            origin: value.origin,
            destination: value.destination,
            created_at: value.created_at,
            updated_at: value.updated_at,
            estimated_delivery: value.estimated_delivery,
            actual_delivery: value.actual_delivery,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shipments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique, indexed)]
    pub tracking_number: String,
    pub user_id: Option<Uuid>,
    pub shipping_method_id: Option<Uuid>,
    pub consignment_number: Option<String>,
    pub description: Option<String>,
    pub cartons: Option<i32>,
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
    pub current_status: String,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub estimated_delivery: Option<Date>,
    pub actual_delivery: Option<Date>,
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
    #[sea_orm(has_many = "super::tracking_events::Entity")]
    TrackingEvents,
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

impl Related<super::tracking_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrackingEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Shipment> for ActiveModel {
    fn from(value: &Shipment) -> Self {
        let (total_cost, pricing_basis, pricing_missing) = cost_columns(value.cost.as_ref());
        Self {
            id: ActiveValue::Set(value.id),
            tracking_number: ActiveValue::Set(value.tracking_number.clone()),
            user_id: ActiveValue::Set(value.user_id),
            shipping_method_id: ActiveValue::Set(value.shipping_method_id),
            consignment_number: ActiveValue::Set(value.consignment_number.clone()),
            description: ActiveValue::Set(value.description.clone()),
            cartons: ActiveValue::Set(value.cartons),
            actual_weight_kg: ActiveValue::Set(decimal_column(value.actual_weight_kg)),
            volume_cbm: ActiveValue::Set(decimal_column(value.volume_cbm)),
            chargeable_weight_kg: ActiveValue::Set(decimal_column(value.chargeable_weight_kg)),
            rate: ActiveValue::Set(decimal_column(value.rate)),
            rate_type: ActiveValue::Set(value.rate_type.map(|r| r.as_str().to_string())),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            total_cost: ActiveValue::Set(total_cost),
            pricing_basis: ActiveValue::Set(pricing_basis),
            pricing_missing: ActiveValue::Set(pricing_missing),
            current_status: ActiveValue::Set(value.current_status.clone()),
            origin: ActiveValue::Set(value.origin.clone()),
            destination: ActiveValue::Set(value.destination.clone()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
            estimated_delivery: ActiveValue::Set(value.estimated_delivery),
            actual_delivery: ActiveValue::Set(value.actual_delivery),
        }
    }
}
