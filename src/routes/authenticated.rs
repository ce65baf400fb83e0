use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Authenticated Router Module
///
/// Every mutating endpoint plus the user listing. The router is wrapped in the
/// auth middleware, so a missing or invalid bearer token is rejected with 401
/// before any handler (and any store write) runs.
///
/// Path parameter names match the public router's (`{county_id}`), since both
/// routers are merged into one route tree.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /users
        .route("/users", get(handlers::list_users))
        // POST /counties
        .route("/counties", post(handlers::create_county))
        // PATCH/DELETE /counties/{county_id}
        .route(
            "/counties/{county_id}",
            patch(handlers::modify_county).delete(handlers::delete_county),
        )
        // POST /counties/{county_id}/cities
        // The county is resolved before the insert; unknown ids never create rows.
        .route("/counties/{county_id}/cities", post(handlers::create_city))
        // PATCH/DELETE /counties/{county_id}/cities/{city_id}
        // The city must belong to the county in the path.
        .route(
            "/counties/{county_id}/cities/{city_id}",
            patch(handlers::modify_city).delete(handlers::delete_city),
        )
}
