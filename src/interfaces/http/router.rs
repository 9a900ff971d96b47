//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::{ApiResponse, PaginatedResponse};
use super::middleware::{admin_auth_middleware, AuthState};
use super::modules::{admin, auth, catalog, health, metrics, payments, reservations};
use crate::application::{CatalogService, ReservationService};
use crate::infrastructure::crypto::JwtConfig;

/// Everything the HTTP layer needs from the running service
#[derive(Clone)]
pub struct ApiContext {
    pub db: DatabaseConnection,
    pub reservations: ReservationService,
    pub catalog: CatalogService,
    pub jwt_config: JwtConfig,
    /// Shared secret expected on payment callbacks
    pub webhook_secret: Option<String>,
    pub metrics: PrometheusHandle,
    pub started_at: Arc<Instant>,
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Admin JWT from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Catalog
        catalog::check_availability,
        catalog::total_price,
        catalog::list_vehicle_types,
        catalog::list_prices,
        // Reservations
        reservations::create_reservation,
        reservations::get_reservation,
        reservations::cancel_reservation,
        reservations::get_by_session,
        // Payments
        payments::payment_event,
        // Auth
        auth::login,
        auth::create_admin,
        // Admin
        admin::list_reservations,
        admin::get_reservation,
        admin::create_reservation,
        admin::cancel_reservation,
        admin::delete_reservation,
        admin::list_vehicle_configs,
        admin::update_vehicle_config,
        admin::run_sweep,
    ),
    components(
        schemas(
            ApiResponse<String>,
            PaginatedResponse<reservations::ReservationDto>,
            health::HealthResponse,
            health::ComponentHealth,
            catalog::AvailabilityResponse,
            catalog::SlotDto,
            catalog::PriceQuoteResponse,
            catalog::VehicleTypeDto,
            catalog::PriceDto,
            reservations::CreateReservationRequest,
            reservations::CreatedReservationResponse,
            reservations::ReservationDto,
            payments::PaymentEvent,
            payments::PaymentEventResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::AdminInfo,
            auth::CreateAdminRequest,
            admin::AdminCancelRequest,
            admin::UpdateVehicleConfigRequest,
            admin::VehicleConfigDto,
            admin::SweepResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Catalog", description = "Availability, price quotes, vehicle types and prices"),
        (name = "Reservations", description = "Customer bookings: create, look up, cancel"),
        (name = "Payments", description = "Payment provider callbacks"),
        (name = "Authentication", description = "Admin login"),
        (name = "Admin", description = "Reservation management, pool and price configuration"),
    ),
    info(
        title = "Parkspace Booking API",
        version = "1.0.0",
        description = "Parking space reservations with shared capacity pools",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(ctx: ApiContext) -> Router {
    let auth_state = AuthState {
        jwt_config: ctx.jwt_config.clone(),
    };
    let auth_handler_state = auth::AuthHandlerState {
        db: ctx.db.clone(),
        jwt_config: ctx.jwt_config.clone(),
    };

    // Public catalog
    let catalog_routes = Router::new()
        .route("/availability", get(catalog::check_availability))
        .route("/total-price", get(catalog::total_price))
        .route("/vehicle-types", get(catalog::list_vehicle_types))
        .route("/prices", get(catalog::list_prices))
        .with_state(catalog::CatalogHandlerState {
            availability: ctx.reservations.availability().clone(),
            pricing: ctx.reservations.pricing().clone(),
            catalog: ctx.catalog.clone(),
        });

    // Customer reservations
    let reservation_routes = Router::new()
        .route("/", post(reservations::create_reservation))
        .route(
            "/{code}",
            get(reservations::get_reservation).delete(reservations::cancel_reservation),
        )
        .route(
            "/session/{provider_reference}",
            get(reservations::get_by_session),
        )
        .with_state(reservations::ReservationHandlerState {
            service: ctx.reservations.clone(),
        });

    // Provider callbacks (shared secret, no JWT)
    let payment_routes = Router::new()
        .route("/events", post(payments::payment_event))
        .with_state(payments::PaymentEventsState {
            service: ctx.reservations.clone(),
            webhook_secret: ctx.webhook_secret.clone(),
        });

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .with_state(auth_handler_state.clone());

    // Admin (protected)
    let admin_user_routes = Router::new()
        .route("/users", post(auth::create_admin))
        .with_state(auth_handler_state);

    let admin_routes = Router::new()
        .route(
            "/reservations",
            get(admin::list_reservations).post(admin::create_reservation),
        )
        .route(
            "/reservations/{code}",
            get(admin::get_reservation).delete(admin::delete_reservation),
        )
        .route(
            "/reservations/{code}/cancel",
            post(admin::cancel_reservation),
        )
        .route("/vehicle-config", get(admin::list_vehicle_configs))
        .route(
            "/vehicle-config/{vehicle_type}",
            put(admin::update_vehicle_config),
        )
        .route("/sweep", post(admin::run_sweep))
        .with_state(admin::AdminHandlerState {
            service: ctx.reservations.clone(),
            catalog: ctx.catalog.clone(),
        })
        .merge(admin_user_routes)
        .layer(middleware::from_fn_with_state(
            auth_state,
            admin_auth_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db: ctx.db.clone(),
            started_at: ctx.started_at.clone(),
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState {
            handle: ctx.metrics.clone(),
        });

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/api/v1", catalog_routes)
        .nest("/api/v1/reservations", reservation_routes)
        .nest("/api/v1/payments", payment_routes)
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/admin", admin_routes)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
