use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod collation;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod lookup;
pub mod models;
pub mod repository;

pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{ApiError, RepositoryError};
pub use repository::{InMemoryRepository, PostgresRepository, Repository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every handler annotated with `#[utoipa::path]`,
/// served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_counties, handlers::create_county, handlers::modify_county,
        handlers::delete_county, handlers::list_cities, handlers::create_city,
        handlers::modify_city, handlers::delete_city, handlers::county_letters,
        handlers::cities_by_letter, handlers::login, handlers::list_users
    ),
    components(
        schemas(
            models::County, models::CityView, models::User, models::CreateCountyRequest,
            models::UpdateCountyRequest, models::CreateCityRequest, models::UpdateCityRequest,
            models::LoginRequest, models::LoginResponse, models::LoggedInUser,
            models::CountyListResponse, models::CountyMutationResponse,
            models::CityListResponse, models::CityMutationResponse, models::LettersResponse,
            models::UserListResponse, error::MessageResponse,
        )
    ),
    tags(
        (name = "zip-api", description = "Counties, cities and zip codes")
    )
)]
struct ApiDoc;

/// AppState
///
/// Immutable container shared by every request: the store handle and the
/// loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub config: AppConfig,
}

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// build_repository
///
/// Postgres (migrated on connect) when `db_url` is set, otherwise the
/// in-memory store. `AppConfig::load` only allows the latter locally.
pub async fn build_repository(config: &AppConfig) -> Result<RepositoryState, RepositoryError> {
    match &config.db_url {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await?;
            let repo = PostgresRepository::new(pool);
            repo.migrate().await?;
            tracing::info!("connected to Postgres, migrations applied");
            Ok(Arc::new(repo))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store");
            Ok(Arc::new(InMemoryRepository::new()))
        }
    }
}

/// seed_login_user
///
/// Creates the configured login user if its email is not registered yet.
pub async fn seed_login_user(
    repo: &dyn Repository,
    seed: &config::SeedUser,
) -> Result<models::User, RepositoryError> {
    let user = repo
        .create_user(models::NewUser {
            name: seed.name.clone(),
            email: seed.email.clone(),
            password_hash: auth::hash_password(&seed.password),
        })
        .await?;
    tracing::info!(user_id = user.id, "login user available");
    Ok(user)
}

/// auth_middleware
///
/// Rejects the request with 401 unless `AuthUser` can be extracted.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing tree, applies the auth layer to the protected
/// routes, and wraps everything in request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// One `http_request` span per request, tagged with the `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
