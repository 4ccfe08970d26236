use api_types::shipping_method::ShippingMethodView;
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState, views};

/// Active shipping methods, by name.
pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ShippingMethodView>>, ServerError> {
    let methods = state.engine.shipping_methods(true).await?;
    Ok(Json(methods.iter().map(views::shipping_method).collect()))
}
