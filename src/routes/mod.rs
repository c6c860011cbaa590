use axum::http::HeaderValue;
use axum::{
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod auth;
pub mod breeds;
pub mod dogs;
pub mod health;
pub mod users;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = match state.config.cors_allowed_origin.as_deref() {
        Some(origins) => {
            let headers: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .filter_map(|value| match value.parse::<HeaderValue>() {
                    Ok(header) => Some(header),
                    Err(_) => {
                        tracing::warn!(origin = value, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(headers))
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true)
        }
        None => CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
    };

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me));

    let users_routes = Router::new()
        .route("/", get(users::list_users))
        .route("/me", put(users::update_me))
        .route("/:id", get(users::get_user))
        .route("/:id/dogs", get(users::list_user_dogs));

    let breeds_routes = Router::new()
        .route("/", get(breeds::list_breeds))
        .route("/groups", get(breeds::list_groups))
        .route("/:id", get(breeds::get_breed));

    let dogs_routes = Router::new()
        .route("/", get(dogs::list_dogs).post(dogs::create_dog))
        .route(
            "/:id",
            get(dogs::get_dog)
                .put(dogs::update_dog)
                .delete(dogs::delete_dog),
        )
        .route("/:id/pedigree", get(dogs::get_pedigree));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/users", users_routes)
        .nest("/api/breeds", breeds_routes)
        .nest("/api/dogs", dogs_routes)
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub(crate) fn to_iso(dt: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc).to_rfc3339()
}
