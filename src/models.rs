use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Stored Records (Mapped to Database) ---

/// County
///
/// Top-level administrative region, stored in the `counties` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct County {
    #[ts(type = "number")]
    pub id: i64,
    pub name: String,
}

/// City
///
/// A row of the `cities` table. `county_id` is fixed at creation and always
/// references an existing county.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub zip_code: i32,
    pub county_id: i64,
}

/// User
///
/// Public identity of an account. The password hash lives only in `UserRecord`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct User {
    #[ts(type = "number")]
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// UserRecord
///
/// Full `users` row including the PHC-format password hash. Internal to login.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
        }
    }
}

// --- Output Projections ---

/// CityView
///
/// The only shape a city is ever serialized in: `zip` is the stored `zip_code`
/// and `county` is the owning county's name, never its id.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct CityView {
    #[ts(type = "number")]
    pub id: i64,
    pub name: String,
    pub zip: i32,
    pub county: String,
}

impl CityView {
    pub fn project(city: City, county: &County) -> Self {
        Self {
            id: city.id,
            name: city.name,
            zip: city.zip_code,
            county: county.name.clone(),
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// CreateCountyRequest
///
/// Input payload for POST /counties.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCountyRequest {
    pub name: String,
}

/// UpdateCountyRequest
///
/// PATCH payload. Absent fields are left untouched; unknown fields are dropped
/// by deserialization and can never reach the store.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCountyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// CreateCityRequest
///
/// Input payload for POST /counties/{county_id}/cities. The county comes from
/// the path, not the body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCityRequest {
    pub name: String,
    pub zip_code: i32,
}

/// UpdateCityRequest
///
/// PATCH payload for a city. Only `name` and `zip_code` are mutable.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCityRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<i32>,
}

impl UpdateCityRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.zip_code.is_none()
    }
}

/// LoginRequest
///
/// Input payload for POST /users/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// NewUser
///
/// Insert payload for the user store; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

// --- Response Envelopes ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CountyListResponse {
    pub counties: Vec<County>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CountyMutationResponse {
    pub message: String,
    pub county: County,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CityListResponse {
    pub cities: Vec<CityView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CityMutationResponse {
    pub message: String,
    pub city: CityView,
}

/// LettersResponse
///
/// Distinct uppercase initials of a county's cities, in Hungarian order.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LettersResponse {
    pub letters: Vec<String>,
}

/// LoggedInUser
///
/// The `user` object returned by a successful login, carrying the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoggedInUser {
    #[ts(type = "number")]
    pub id: i64,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub user: LoggedInUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserListResponse {
    pub users: Vec<User>,
}
