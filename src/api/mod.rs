//! HTTP surface: WebSocket upgrade routes, system endpoints, and OpenAPI
//! documentation.

pub mod system;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// OpenAPI document for the HTTP endpoints.
#[derive(Debug, utoipa::OpenApi)]
#[openapi(
    info(title = "genesis-relay", description = "WebSocket command relay"),
    paths(system::health_handler),
    components(schemas(system::HealthResponse)),
    tags((name = "System", description = "Service health"))
)]
pub struct ApiDoc;

/// Builds the complete router: WebSocket upgrade on `/` and `/ws`, plus
/// the system endpoints (and Swagger UI when the `swagger-ui` feature is
/// enabled).
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .merge(system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url(
                "/api-docs/openapi.json",
                <ApiDoc as utoipa::OpenApi>::openapi(),
            ),
    );

    router
}
