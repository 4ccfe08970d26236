use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    CargoUpdate, EngineError, IdentifierKind, Priced, ResultEngine, Shipment, ShipmentDetails,
    ShipmentFilter, ShipmentNew, ShippingMethod, StatusUpdate, TrackingEvent, TrackingEventNew,
    shipments, shipping_methods, tracking_events, unique_identifier,
    validation::normalize_optional_text,
};

use super::{Engine, Page, PageRequest, quotes::methods_by_id, trace_pricing, with_tx};

/// Event type recorded when a shipment is registered.
const CREATED_EVENT: &str = "created";

impl Engine {
    /// Register a shipment under a fresh tracking number.
    ///
    /// An unknown `shipping_method_id` does not fail the call: the shipment
    /// is stored without a method and priced per kg from the explicit rate.
    pub async fn create_shipment(&self, new: ShipmentNew) -> ResultEngine<ShipmentDetails> {
        with_tx!(self, |db_tx| {
            let method = match new.shipping_method_id {
                Some(id) => {
                    let method = shipping_methods::Entity::find_by_id(id)
                        .one(&db_tx)
                        .await?
                        .map(ShippingMethod::try_from)
                        .transpose()?;
                    if method.is_none() {
                        tracing::warn!(
                            method_id = %id,
                            "shipping method not found, shipment priced without rate type"
                        );
                    }
                    method
                }
                None => None,
            };
            let snapshot = method.as_ref().map(ShippingMethod::snapshot);

            let conn = &db_tx;
            let tracking_number =
                unique_identifier(IdentifierKind::TrackingNumber, move |candidate| async move {
                    Ok::<_, EngineError>(
                        shipments::Entity::find()
                            .filter(shipments::Column::TrackingNumber.eq(candidate))
                            .one(conn)
                            .await?
                            .is_some(),
                    )
                })
                .await?;

            let shipment = Shipment::new(tracking_number, &new, snapshot.as_ref())?;
            let model: shipments::ActiveModel = (&shipment).into();
            model.insert(&db_tx).await?;

            let created = TrackingEvent::new(
                shipment.id,
                &TrackingEventNew {
                    event_type: CREATED_EVENT.to_string(),
                    location: shipment.origin.clone(),
                    description: None,
                    is_current: true,
                    event_time: Some(shipment.created_at),
                },
            )?;
            let event_model: tracking_events::ActiveModel = (&created).into();
            event_model.insert(&db_tx).await?;

            trace_pricing(
                "shipment",
                Some(&shipment.tracking_number),
                &shipment.pricing_input().compute(),
            );
            tracing::info!(
                shipment_id = %shipment.id,
                tracking_number = %shipment.tracking_number,
                "shipment created"
            );

            Ok(ShipmentDetails {
                shipment,
                shipping_method: method,
                events: vec![created],
            })
        })
    }

    /// Return a shipment with its method and tracking history.
    pub async fn shipment(&self, shipment_id: Uuid) -> ResultEngine<ShipmentDetails> {
        with_tx!(self, |db_tx| {
            let shipment = require_shipment(&db_tx, shipment_id).await?;
            load_details(&db_tx, shipment).await
        })
    }

    /// Look a shipment up by tracking number, case-insensitively.
    pub async fn shipment_by_tracking(
        &self,
        tracking_number: &str,
    ) -> ResultEngine<ShipmentDetails> {
        let tracking_number = tracking_number.trim().to_uppercase();
        with_tx!(self, |db_tx| {
            let model = shipments::Entity::find()
                .filter(shipments::Column::TrackingNumber.eq(tracking_number))
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("tracking number not exists".to_string())
                })?;
            load_details(&db_tx, Shipment::try_from(model)?).await
        })
    }

    /// Shipments newest first, optionally restricted to a user and a status.
    pub async fn shipments_page(
        &self,
        request: PageRequest,
        filter: &ShipmentFilter,
    ) -> ResultEngine<Page<ShipmentDetails>> {
        with_tx!(self, |db_tx| {
            let mut query = shipments::Entity::find();
            if let Some(user_id) = filter.user_id {
                query = query.filter(shipments::Column::UserId.eq(user_id));
            }
            if let Some(status) = normalize_optional_text(filter.status.as_deref()) {
                query = query.filter(shipments::Column::CurrentStatus.eq(status));
            }
            let paginator = query
                .order_by_desc(shipments::Column::CreatedAt)
                .paginate(&db_tx, request.per_page);
            let total = paginator.num_items().await?;
            let records = paginator
                .fetch_page(request.index())
                .await?
                .into_iter()
                .map(Shipment::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let method_ids = records
                .iter()
                .filter_map(|shipment| shipment.shipping_method_id)
                .collect();
            let methods = methods_by_id(&db_tx, method_ids).await?;
            let mut events = events_by_shipment(
                &db_tx,
                records.iter().map(|shipment| shipment.id).collect(),
            )
            .await?;

            let items = records
                .into_iter()
                .map(|shipment| ShipmentDetails {
                    shipping_method: shipment
                        .shipping_method_id
                        .and_then(|id| methods.get(&id).cloned()),
                    events: events.remove(&shipment.id).unwrap_or_default(),
                    shipment,
                })
                .collect();
            Ok(Page::new(items, total, request))
        })
    }

    /// Change the status and/or append a tracking event.
    ///
    /// Earlier events are never modified.
    pub async fn update_shipment_status(
        &self,
        shipment_id: Uuid,
        update: StatusUpdate,
    ) -> ResultEngine<ShipmentDetails> {
        if update.status.is_none() && update.event.is_none() {
            return Err(EngineError::InvalidInput(
                "status or event is required".to_string(),
            ));
        }
        let today = Utc::now().date_naive();
        with_tx!(self, |db_tx| {
            let mut shipment = require_shipment(&db_tx, shipment_id).await?;

            if let Some(status) = update.status.as_deref() {
                shipment.set_status(status, today)?;
                let model: shipments::ActiveModel = (&shipment).into();
                model.update(&db_tx).await?;
            }
            if let Some(event) = update.event.as_ref() {
                let event = TrackingEvent::new(shipment.id, event)?;
                let model: tracking_events::ActiveModel = (&event).into();
                model.insert(&db_tx).await?;
            }

            tracing::info!(
                shipment_id = %shipment.id,
                status = %shipment.current_status,
                "shipment status updated"
            );
            load_details(&db_tx, shipment).await
        })
    }

    /// Change cargo details. Measurements are repriced from the shipment's
    /// own rate snapshot.
    pub async fn update_shipment_cargo(
        &self,
        shipment_id: Uuid,
        update: CargoUpdate,
    ) -> ResultEngine<ShipmentDetails> {
        with_tx!(self, |db_tx| {
            let mut shipment = require_shipment(&db_tx, shipment_id).await?;
            let result = shipment.apply_cargo(&update)?;
            let model: shipments::ActiveModel = (&shipment).into();
            model.update(&db_tx).await?;

            if update.changes_measurements() {
                trace_pricing("shipment", Some(&shipment.tracking_number), &result);
            }
            load_details(&db_tx, shipment).await
        })
    }

    /// Reprice a shipment from its stored measurements and snapshot.
    pub async fn recalculate_shipment(&self, shipment_id: Uuid) -> ResultEngine<ShipmentDetails> {
        with_tx!(self, |db_tx| {
            let mut shipment = require_shipment(&db_tx, shipment_id).await?;
            let result = shipment.recalculate();
            shipment.updated_at = Utc::now();
            let model: shipments::ActiveModel = (&shipment).into();
            model.update(&db_tx).await?;

            trace_pricing("shipment", Some(&shipment.tracking_number), &result);
            load_details(&db_tx, shipment).await
        })
    }
}

async fn require_shipment(db_tx: &DatabaseTransaction, shipment_id: Uuid) -> ResultEngine<Shipment> {
    let model = shipments::Entity::find_by_id(shipment_id)
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("shipment not exists".to_string()))?;
    Shipment::try_from(model)
}

async fn load_details(
    db_tx: &DatabaseTransaction,
    shipment: Shipment,
) -> ResultEngine<ShipmentDetails> {
    let shipping_method = match shipment.shipping_method_id {
        Some(id) => shipping_methods::Entity::find_by_id(id)
            .one(db_tx)
            .await?
            .map(ShippingMethod::try_from)
            .transpose()?,
        None => None,
    };
    let events = tracking_events::Entity::find()
        .filter(tracking_events::Column::ShipmentId.eq(shipment.id))
        .order_by_asc(tracking_events::Column::EventTime)
        .order_by_asc(tracking_events::Column::CreatedAt)
        .all(db_tx)
        .await?
        .into_iter()
        .map(TrackingEvent::from)
        .collect();
    Ok(ShipmentDetails {
        shipment,
        shipping_method,
        events,
    })
}

async fn events_by_shipment(
    db_tx: &DatabaseTransaction,
    shipment_ids: Vec<Uuid>,
) -> ResultEngine<HashMap<Uuid, Vec<TrackingEvent>>> {
    let mut events: HashMap<Uuid, Vec<TrackingEvent>> = HashMap::new();
    if shipment_ids.is_empty() {
        return Ok(events);
    }
    for model in tracking_events::Entity::find()
        .filter(tracking_events::Column::ShipmentId.is_in(shipment_ids))
        .order_by_asc(tracking_events::Column::EventTime)
        .order_by_asc(tracking_events::Column::CreatedAt)
        .all(db_tx)
        .await?
    {
        events
            .entry(model.shipment_id)
            .or_default()
            .push(TrackingEvent::from(model));
    }
    Ok(events)
}
