use api_types::warehouse::{WarehouseList, WarehouseQuery};
use axum::{
    Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState, views};

/// Active locations, filtered by `country` and `shipping_type`.
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<WarehouseQuery>,
) -> Result<Json<WarehouseList>, ServerError> {
    let found = state
        .engine
        .warehouses(
            query.country.as_deref(),
            query.shipping_type.map(views::engine_freight_mode),
        )
        .await?;

    Ok(Json(WarehouseList {
        warehouses: found.iter().map(views::warehouse).collect(),
    }))
}
