//! Registration, login and token refresh.

use api_types::auth::{
    AccessToken, AuthResponse, LoginRequest, Me, RefreshRequest, RegisterRequest,
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{EngineError, Notification, User, notify};

use crate::{ServerError, auth::TokenType, server::ServerState, views};

fn auth_response(state: &ServerState, user: &User) -> Result<AuthResponse, ServerError> {
    let tokens = state.jwt.issue_pair(user)?;
    Ok(AuthResponse {
        user: views::user(user),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    })
}

/// Create a customer account and log it in.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ServerError> {
    let user = state
        .engine
        .register_user(
            &payload.email,
            &payload.password,
            &payload.full_name,
            payload.phone.as_deref(),
        )
        .await?;
    tracing::info!(user = %user.id, "user registered");
    notify(&*state.notifier, &Notification::welcome(&user));

    Ok((StatusCode::CREATED, Json(auth_response(&state, &user)?)))
}

pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ServerError> {
    let user = state
        .engine
        .authenticate(&payload.email, &payload.password)
        .await?;
    Ok(Json(auth_response(&state, &user)?))
}

/// Exchange a refresh token for a new access token.
pub async fn refresh(
    State(state): State<ServerState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AccessToken>, ServerError> {
    let claims = state.jwt.verify(&payload.refresh_token, TokenType::Refresh)?;
    let user = state.engine.user(claims.sub).await.map_err(|err| match err {
        EngineError::KeyNotFound(_) => ServerError::Unauthorized("user not found".to_string()),
        other => other.into(),
    })?;

    Ok(Json(AccessToken {
        access_token: state.jwt.issue_access(&user)?,
    }))
}

pub async fn me(Extension(user): Extension<User>) -> Json<Me> {
    Json(Me {
        user: views::user(&user),
    })
}
