//! Shipment tracking endpoints

use api_types::{
    PageQuery,
    tracking::{ShipmentList, ShipmentResponse, TrackingSearch},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use engine::{EngineError, PageRequest, ShipmentFilter, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

/// Public lookup by tracking number.
pub async fn by_number(
    State(state): State<ServerState>,
    Path(tracking_number): Path<String>,
) -> Result<Json<ShipmentResponse>, ServerError> {
    let details = state.engine.shipment_by_tracking(&tracking_number).await?;
    Ok(Json(ShipmentResponse {
        shipment: views::shipment(&details),
    }))
}

pub async fn search(
    State(state): State<ServerState>,
    Json(payload): Json<TrackingSearch>,
) -> Result<Json<ShipmentResponse>, ServerError> {
    if payload.tracking_number.trim().is_empty() {
        return Err(EngineError::InvalidInput("tracking number is required".to_string()).into());
    }
    let details = state
        .engine
        .shipment_by_tracking(&payload.tracking_number)
        .await?;
    Ok(Json(ShipmentResponse {
        shipment: views::shipment(&details),
    }))
}

pub async fn mine(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ShipmentList>, ServerError> {
    let filter = ShipmentFilter {
        user_id: Some(user.id),
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

/// Full shipment details, for its owner or staff.
pub async fn shipment(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShipmentResponse>, ServerError> {
    let details = state.engine.shipment(id).await?;
    if !user.can_access(details.shipment.user_id) {
        return Err(EngineError::Forbidden("access denied".to_string()).into());
    }

    Ok(Json(ShipmentResponse {
        shipment: views::shipment(&details),
    }))
}
