//! Staff shipment management

use api_types::{
    PageQuery,
    admin::{CargoUpdate, ShipmentCreate, StatusUpdate},
    tracking::{ShipmentList, ShipmentResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    Currency, Notification, PageRequest, ShipmentDetails, ShipmentFilter, ShipmentNew,
    TrackingEventNew, User, notify,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

fn response(details: &ShipmentDetails) -> Json<ShipmentResponse> {
    Json(ShipmentResponse {
        shipment: views::shipment(details),
    })
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ShipmentList>, ServerError> {
    let filter = ShipmentFilter {
        user_id: None,
        status: query.status,
    };
    let page = state
        .engine
        .shipments_page(PageRequest::new(query.page, query.per_page), &filter)
        .await?;

    Ok(Json(ShipmentList {
        shipments: page.items.iter().map(views::shipment).collect(),
        total: page.total,
        pages: page.pages,
        current_page: page.current_page,
    }))
}

pub async fn create(
    Extension(staff): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ShipmentCreate>,
) -> Result<(StatusCode, Json<ShipmentResponse>), ServerError> {
    let currency = payload
        .currency
        .as_deref()
        .map(str::parse::<Currency>)
        .transpose()?;

    let details = state
        .engine
        .create_shipment(ShipmentNew {
            user_id: payload.user_id,
            shipping_method_id: payload.shipping_method_id,
            consignment_number: payload.consignment_number,
            description: payload.description,
            cartons: payload.cartons,
            actual_weight_kg: payload.actual_weight,
            volume_cbm: payload.volume_cbm,
            rate: payload.rate,
            currency,
            current_status: payload.status,
            origin: payload.origin,
            destination: payload.destination,
            estimated_delivery: payload.estimated_delivery,
        })
        .await?;
    tracing::info!(
        staff = %staff.id,
        tracking_number = %details.shipment.tracking_number,
        "shipment created"
    );

    Ok((StatusCode::CREATED, response(&details)))
}

/// Set a new status and/or append a tracking event.
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdate>,
) -> Result<Json<ShipmentResponse>, ServerError> {
    let event = payload.event_type.map(|event_type| TrackingEventNew {
        event_type,
        location: payload.location,
        description: payload.description,
        is_current: payload.is_current,
        event_time: None,
    });
    let location = event.as_ref().and_then(|e| e.location.clone());

    let details = state
        .engine
        .update_shipment_status(
            id,
            engine::StatusUpdate {
                status: payload.status,
                event,
            },
        )
        .await?;

    notify_owner(&state, &details, location).await;
    Ok(response(&details))
}

async fn notify_owner(state: &ServerState, details: &ShipmentDetails, location: Option<String>) {
    let Some(owner_id) = details.shipment.user_id else {
        return;
    };
    match state.engine.user(owner_id).await {
        Ok(owner) => notify(
            &*state.notifier,
            &Notification::TrackingUpdate {
                email: owner.email,
                phone: owner.phone,
                tracking_number: details.shipment.tracking_number.clone(),
                status: details.shipment.current_status.clone(),
                location,
            },
        ),
        Err(err) => tracing::debug!(owner = %owner_id, %err, "no tracking notification sent"),
    }
}

/// Correct measurements or cargo details; the cost is repriced.
pub async fn update_cargo(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CargoUpdate>,
) -> Result<Json<ShipmentResponse>, ServerError> {
    let details = state
        .engine
        .update_shipment_cargo(
            id,
            engine::CargoUpdate {
                actual_weight_kg: payload.actual_weight,
                volume_cbm: payload.volume_cbm,
                cartons: payload.cartons,
                description: payload.description,
                consignment_number: payload.consignment_number,
            },
        )
        .await?;
    Ok(response(&details))
}

pub async fn recalculate(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShipmentResponse>, ServerError> {
    let details = state.engine.recalculate_shipment(id).await?;
    Ok(response(&details))
}
