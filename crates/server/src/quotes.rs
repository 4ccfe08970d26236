//! Quote API endpoints

use api_types::{
    PageQuery,
    quote::{QuoteList, QuoteRequest, QuoteResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{EngineError, Notification, PageRequest, User, notify};

use crate::{ServerError, server::ServerState, views};

/// Price cargo without saving a quote.
pub async fn calculate(
    State(state): State<ServerState>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ServerError> {
    let details = state
        .engine
        .calculate_quote(
            payload.shipping_method_id,
            payload.actual_weight,
            payload.volume_cbm,
        )
        .await?;

    Ok(Json(QuoteResponse {
        quote: views::quote(&details),
    }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<QuoteRequest>,
) -> Result<(StatusCode, Json<QuoteResponse>), ServerError> {
    let details = state
        .engine
        .create_quote(
            user.id,
            payload.shipping_method_id,
            payload.actual_weight,
            payload.volume_cbm,
        )
        .await?;

    if let Some(quote_number) = details.quote.quote_number.clone() {
        notify(
            &*state.notifier,
            &Notification::QuoteReady {
                email: user.email.clone(),
                quote_number,
                shipping_method: details.shipping_method.as_ref().map(|m| m.name.clone()),
                total_cost: details.quote.total_cost(),
                currency: details.quote.currency.clone(),
            },
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(QuoteResponse {
            quote: views::quote(&details),
        }),
    ))
}

pub async fn mine(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<QuoteList>, ServerError> {
    let page = state
        .engine
        .quotes_for_user(user.id, PageRequest::new(query.page, query.per_page))
        .await?;

    Ok(Json(QuoteList {
        quotes: page.items.iter().map(views::quote).collect(),
        total: page.total,
        pages: page.pages,
        current_page: page.current_page,
    }))
}

/// A quote by number, for its owner or staff.
pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(quote_number): Path<String>,
) -> Result<Json<QuoteResponse>, ServerError> {
    let details = state.engine.quote_by_number(&quote_number).await?;
    if !user.can_access(details.quote.user_id) {
        return Err(EngineError::Forbidden("access denied".to_string()).into());
    }

    Ok(Json(QuoteResponse {
        quote: views::quote(&details),
    }))
}
