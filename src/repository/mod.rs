use crate::{
    error::RepositoryError,
    models::{
        City, County, CreateCityRequest, CreateCountyRequest, NewUser, UpdateCityRequest,
        UpdateCountyRequest, User, UserRecord,
    },
};
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// Abstract contract for every persistence operation. Handlers only see this
/// trait, so the Postgres store and the in-memory store are interchangeable.
///
/// Absence is never an error: lookups yield `Option`, deletes yield `bool`.
/// `Err` is reserved for store failures and constraint violations.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Counties ---
    async fn list_counties(&self) -> RepoResult<Vec<County>>;
    async fn find_county_by_id(&self, id: i64) -> RepoResult<Option<County>>;
    async fn create_county(&self, req: CreateCountyRequest) -> RepoResult<County>;
    // Applies only the fields present in `patch`.
    async fn update_county(&self, id: i64, patch: UpdateCountyRequest) -> RepoResult<Option<County>>;
    // Fails with `ForeignKeyViolation` while cities still reference the county.
    async fn delete_county(&self, id: i64) -> RepoResult<bool>;

    // --- Cities ---
    async fn list_cities(&self, county_id: i64) -> RepoResult<Vec<City>>;
    // Matches only when the city belongs to `county_id`.
    async fn find_city_by_id_and_county(
        &self,
        county_id: i64,
        city_id: i64,
    ) -> RepoResult<Option<City>>;
    // Fails with `ForeignKeyViolation` if `county_id` does not exist.
    async fn create_city(&self, county_id: i64, req: CreateCityRequest) -> RepoResult<City>;
    async fn update_city(
        &self,
        county_id: i64,
        city_id: i64,
        patch: UpdateCityRequest,
    ) -> RepoResult<Option<City>>;
    async fn delete_city(&self, county_id: i64, city_id: i64) -> RepoResult<bool>;

    // --- Letter Index ---
    async fn city_names(&self, county_id: i64) -> RepoResult<Vec<String>>;
    /// Cities whose name case-insensitively starts with `letter`. May contain
    /// false positives under lenient store collations; callers re-verify.
    async fn cities_by_initial(&self, county_id: i64, letter: &str) -> RepoResult<Vec<City>>;

    // --- Users ---
    async fn find_user_by_id(&self, id: i64) -> RepoResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>>;
    async fn list_users(&self) -> RepoResult<Vec<User>>;
    // Returns the existing user unchanged when the email is already taken.
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
}

/// RepositoryState
///
/// The shared handle stored in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;
