//! HTTP routes.

mod send;

use std::sync::Arc;

use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method};
use axum::routing::post;
use sendwire_core::{DeliveryLog, SettingsStore};
use sendwire_smtp::Connector;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use send::{SendEmailBody, SendEmailResponse};

/// Creates the router.
///
/// Browsers may call the endpoint from any origin; pre-flight `OPTIONS`
/// requests are answered by the CORS layer without reaching a handler.
pub fn create_router<S, L, C>(state: Arc<AppState<S, L, C>>) -> Router
where
    S: SettingsStore + 'static,
    L: DeliveryLog + 'static,
    C: Connector + Clone + 'static,
{
    Router::new()
        .route("/send-email", post(send::send_email))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
}
