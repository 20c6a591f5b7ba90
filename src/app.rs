use axum::{
    extract::FromRef,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::SharedVerifier;
use crate::config::SecurityConfig;
use crate::database::SharedStore;
use crate::handlers::{self, protected, public};
use crate::middleware::verify_token;

/// Process-wide handles, created once in `main` and cloned per request.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: SharedStore,
    pub verifier: SharedVerifier,
}

impl AppState {
    pub fn new(store: SharedStore, verifier: SharedVerifier) -> Self {
        Self { store, verifier }
    }
}

pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    Router::new()
        .merge(status_routes())
        .merge(user_routes(state.clone()))
        .merge(watch_routes())
        .merge(order_routes())
        .merge(review_routes())
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(security)),
        )
}

fn status_routes() -> Router<AppState> {
    use public::status;

    Router::new()
        .route("/", get(status::root))
        .route("/health", get(status::health))
}

fn user_routes(state: AppState) -> Router<AppState> {
    use public::users;

    Router::new()
        .route("/user/:email", get(users::admin_status))
        .route("/users/:email", get(users::admin_status))
        .route("/users", post(users::create).put(users::upsert))
        .route("/all-users", get(users::list))
        // Only admin promotion carries token verification
        .route(
            "/users/admin",
            put(protected::make_admin)
                .route_layer(middleware::from_fn_with_state(state, verify_token)),
        )
}

fn watch_routes() -> Router<AppState> {
    use public::watches;

    Router::new()
        .route("/add-watch", post(watches::create))
        .route("/watches", get(watches::list))
        .route("/watch/:id", get(watches::get).delete(watches::delete))
}

fn order_routes() -> Router<AppState> {
    use axum::routing::delete;
    use public::orders;

    Router::new()
        .route("/order-watch", post(orders::create))
        .route("/orders", get(orders::list))
        .route("/orders/:id", delete(orders::delete))
        .route("/update-status/:id", put(orders::update_status))
}

fn review_routes() -> Router<AppState> {
    use public::reviews;

    Router::new()
        .route("/review", post(reviews::create))
        .route("/all-review", get(reviews::list))
}

/// Any origin unless `CORS_ORIGINS` names an allow-list.
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
