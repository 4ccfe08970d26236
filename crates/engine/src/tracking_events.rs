//! Tracking history of a shipment.
//!
//! Events are append-only and ordered by `event_time`. Pricing never reads
//! or writes them.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{
    ResultEngine,
    validation::{normalize_optional_text, normalize_required},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackingEvent {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub event_type: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub is_current: bool,
    pub event_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A new event to append to a shipment.
#[derive(Clone, Debug, Default)]
pub struct TrackingEventNew {
    pub event_type: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub is_current: bool,
    /// Defaults to now.
    pub event_time: Option<DateTime<Utc>>,
}

impl TrackingEvent {
    pub fn new(shipment_id: Uuid, event: &TrackingEventNew) -> ResultEngine<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            shipment_id,
            event_type: normalize_required(&event.event_type, "event type")?,
            location: normalize_optional_text(event.location.as_deref()),
            description: normalize_optional_text(event.description.as_deref()),
            is_current: event.is_current,
            event_time: event.event_time.unwrap_or(now),
            created_at: now,
        })
    }
}

impl From<Model> for TrackingEvent {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            shipment_id: value.shipment_id,
            event_type: value.event_type,
            location: value.location,
            description: value.description,
            is_current: value.is_current,
            event_time: value.event_time,
            created_at: value.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "tracking_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub event_type: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub is_current: bool,
    pub event_time: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shipments::Entity",
        from = "Column::ShipmentId",
        to = "super::shipments::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Shipments,
}

impl Related<super::shipments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TrackingEvent> for ActiveModel {
    fn from(value: &TrackingEvent) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            shipment_id: ActiveValue::Set(value.shipment_id),
            event_type: ActiveValue::Set(value.event_type.clone()),
            location: ActiveValue::Set(value.location.clone()),
            description: ActiveValue::Set(value.description.clone()),
            is_current: ActiveValue::Set(value.is_current),
            event_time: ActiveValue::Set(value.event_time),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}
