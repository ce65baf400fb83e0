use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a bearer token: read-only lookups, the letter
/// index and login. Every county-scoped handler resolves the county first and
/// answers 404 "County not found" for unknown ids.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /users/login
        // Exchanges email + password for a bearer token.
        .route("/users/login", post(handlers::login))
        // GET /counties
        .route("/counties", get(handlers::list_counties))
        // GET /counties/{county_id}/cities
        // Cities projected to `{id, name, zip, county}`.
        .route("/counties/{county_id}/cities", get(handlers::list_cities))
        // GET /counties/{county_id}/abc
        // Distinct initials in Hungarian alphabetical order.
        .route("/counties/{county_id}/abc", get(handlers::county_letters))
        // GET /counties/{county_id}/abc/{letter}
        // Cities starting with `letter`, case-insensitive, exact after verification.
        .route(
            "/counties/{county_id}/abc/{letter}",
            get(handlers::cities_by_letter),
        )
}
