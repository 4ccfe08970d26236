use api_types::Health;
use axum::{
    Extension, Json, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use std::sync::Arc;

use crate::{
    ServerError, admin,
    auth::{AuthConfig, JwtKeys, TokenType},
    quotes, shipping_methods, tracking, user, warehouses,
};
use engine::{Engine, EngineError, LogNotifier, Notifier, User};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub jwt: Arc<JwtKeys>,
    pub notifier: Arc<dyn Notifier>,
}

impl ServerState {
    pub fn new(engine: Engine, auth: &AuthConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            jwt: Arc::new(JwtKeys::new(auth)),
            notifier: Arc::new(LogNotifier),
        }
    }
}

/// Resolves the bearer access token to an active [`User`] extension.
async fn auth(
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(ServerError::Unauthorized("missing bearer token".to_string()));
    };

    let claims = state.jwt.verify(bearer.token(), TokenType::Access)?;
    let user = match state.engine.user(claims.sub).await {
        Ok(user) => user,
        Err(EngineError::KeyNotFound(_)) => {
            return Err(ServerError::Unauthorized("user not found".to_string()));
        }
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn staff_only(
    Extension(user): Extension<User>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if !user.role.is_staff() {
        tracing::warn!(user = %user.id, "staff route refused");
        return Err(EngineError::Forbidden("staff access required".to_string()).into());
    }
    Ok(next.run(request).await)
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy".to_string(),
    })
}

pub fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(user::register))
        .route("/auth/login", post(user::login))
        .route("/auth/refresh", post(user::refresh))
        .route("/shipping-methods", get(shipping_methods::list))
        .route("/quotes/calculate", post(quotes::calculate))
        .route("/tracking/search", post(tracking::search))
        .route("/tracking/{tracking_number}", get(tracking::by_number))
        .route("/warehouses", get(warehouses::list));

    let authenticated = Router::new()
        .route("/auth/me", get(user::me))
        .route("/quotes", post(quotes::create))
        .route("/quotes/my-quotes", get(quotes::mine))
        .route("/quotes/{quote_number}", get(quotes::get))
        .route("/tracking/my-shipments", get(tracking::mine))
        .route("/tracking/shipment/{id}", get(tracking::shipment))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    let staff = Router::new()
        .route("/shipments", get(admin::list).post(admin::create))
        .route("/shipments/{id}/status", put(admin::update_status))
        .route("/shipments/{id}/cargo", patch(admin::update_cargo))
        .route("/shipments/{id}/recalculate", post(admin::recalculate))
        .route_layer(middleware::from_fn(staff_only))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .nest(
            "/api",
            public.merge(authenticated).nest("/admin", staff),
        )
        .with_state(state)
}

pub async fn run(engine: Engine, auth: AuthConfig, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, auth, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    auth: AuthConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState::new(engine, &auth);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    auth: AuthConfig,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, auth, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
