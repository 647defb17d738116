use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod bookings;
pub mod error;
pub mod events;
pub mod middleware;
pub mod news;
pub mod state;
pub mod users;
pub mod venues;

pub use state::{AppState, AuthConfig};

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let admin = Router::new()
        .merge(events::admin_routes())
        .merge(venues::admin_routes())
        .merge(news::admin_routes())
        .merge(users::admin_routes())
        .merge(bookings::admin_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::admin_auth_middleware,
        ));

    let authed = auth::authed_routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(auth::public_routes())
        .merge(events::public_routes())
        .merge(venues::public_routes())
        .merge(news::public_routes())
        .merge(bookings::public_routes())
        .merge(authed)
        .merge(admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
