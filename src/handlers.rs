use crate::{
    AppState,
    auth::{self, AuthUser},
    collation,
    error::{ApiError, MessageResponse, RepositoryError},
    extract::{ApiJson, ApiPath},
    lookup::{resolve_city, resolve_county},
    models::{
        CityListResponse, CityMutationResponse, CityView, CountyListResponse,
        CountyMutationResponse, CreateCityRequest, CreateCountyRequest, LettersResponse,
        LoggedInUser, LoginRequest, LoginResponse, UpdateCityRequest, UpdateCountyRequest,
        UserListResponse,
    },
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use unicode_normalization::UnicodeNormalization;

/// Valid range of a stored zip code (an unsigned 16-bit value).
pub const ZIP_CODE_RANGE: std::ops::RangeInclusive<i32> = 0..=65_535;

// --- Input Validation ---

// Names are stored trimmed and in NFC.
fn required_name(name: &str) -> Result<String, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation("The name field is required.".to_string()));
    }
    Ok(trimmed.nfc().collect())
}

fn valid_zip_code(zip_code: i32) -> Result<i32, ApiError> {
    if ZIP_CODE_RANGE.contains(&zip_code) {
        Ok(zip_code)
    } else {
        Err(ApiError::Validation(format!(
            "The zip code field must be between {} and {}.",
            ZIP_CODE_RANGE.start(),
            ZIP_CODE_RANGE.end()
        )))
    }
}

// --- County Handlers ---

/// list_counties
///
/// [Public Route] Every county as `{id, name}`.
#[utoipa::path(
    get,
    path = "/counties",
    responses((status = 200, description = "All counties", body = CountyListResponse))
)]
pub async fn list_counties(State(state): State<AppState>) -> Result<Json<CountyListResponse>, ApiError> {
    let counties = state.repo.list_counties().await?;
    Ok(Json(CountyListResponse { counties }))
}

/// create_county
///
/// [Authenticated Route] Creates a county from a non-blank name.
#[utoipa::path(
    post,
    path = "/counties",
    request_body = CreateCountyRequest,
    responses(
        (status = 201, description = "Created", body = CountyMutationResponse),
        (status = 401, description = "Unauthenticated", body = MessageResponse),
        (status = 422, description = "Invalid payload", body = MessageResponse)
    )
)]
pub async fn create_county(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCountyRequest>,
) -> Result<(StatusCode, Json<CountyMutationResponse>), ApiError> {
    let name = required_name(&payload.name)?;
    let county = state.repo.create_county(CreateCountyRequest { name }).await?;
    tracing::info!(user_id, county_id = county.id, "county created");
    Ok((
        StatusCode::CREATED,
        Json(CountyMutationResponse {
            message: "County created successfully".to_string(),
            county,
        }),
    ))
}

/// modify_county
///
/// [Authenticated Route] Partial update; absent fields keep their stored value.
#[utoipa::path(
    patch,
    path = "/counties/{county_id}",
    params(("county_id" = i64, Path, description = "County ID")),
    request_body = UpdateCountyRequest,
    responses(
        (status = 200, description = "Updated", body = CountyMutationResponse),
        (status = 401, description = "Unauthenticated", body = MessageResponse),
        (status = 404, description = "County not found", body = MessageResponse)
    )
)]
pub async fn modify_county(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiPath(county_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateCountyRequest>,
) -> Result<Json<CountyMutationResponse>, ApiError> {
    resolve_county(state.repo.as_ref(), county_id).await?;

    let patch = UpdateCountyRequest {
        name: payload.name.as_deref().map(required_name).transpose()?,
    };
    // The row can vanish between lookup and update under concurrent deletes.
    let county = state
        .repo
        .update_county(county_id, patch)
        .await?
        .ok_or(ApiError::CountyNotFound)?;

    Ok(Json(CountyMutationResponse {
        message: "County updated successfully".to_string(),
        county,
    }))
}

/// delete_county
///
/// [Authenticated Route] Removes a county. Rejected with 409 while any city
/// still references it; nothing cascades.
#[utoipa::path(
    delete,
    path = "/counties/{county_id}",
    params(("county_id" = i64, Path, description = "County ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 401, description = "Unauthenticated", body = MessageResponse),
        (status = 404, description = "County not found", body = MessageResponse),
        (status = 409, description = "County still has cities", body = MessageResponse)
    )
)]
pub async fn delete_county(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiPath(county_id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    resolve_county(state.repo.as_ref(), county_id).await?;
    if !state.repo.delete_county(county_id).await? {
        return Err(ApiError::CountyNotFound);
    }
    Ok(Json(MessageResponse::new("County deleted successfully")))
}

// --- City Handlers ---

/// list_cities
///
/// [Public Route] Cities of one county, each projected to `{id, name, zip, county}`.
#[utoipa::path(
    get,
    path = "/counties/{county_id}/cities",
    params(("county_id" = i64, Path, description = "County ID")),
    responses(
        (status = 200, description = "Cities of the county", body = CityListResponse),
        (status = 404, description = "County not found", body = MessageResponse)
    )
)]
pub async fn list_cities(
    State(state): State<AppState>,
    ApiPath(county_id): ApiPath<i64>,
) -> Result<Json<CityListResponse>, ApiError> {
    let county = resolve_county(state.repo.as_ref(), county_id).await?;
    let cities = state
        .repo
        .list_cities(county_id)
        .await?
        .into_iter()
        .map(|city| CityView::project(city, &county))
        .collect();
    Ok(Json(CityListResponse { cities }))
}

/// create_city
///
/// [Authenticated Route] Creates a city under the county named in the path.
/// The county is resolved first, so an unknown county never reaches the store.
#[utoipa::path(
    post,
    path = "/counties/{county_id}/cities",
    params(("county_id" = i64, Path, description = "County ID")),
    request_body = CreateCityRequest,
    responses(
        (status = 201, description = "Created", body = CityMutationResponse),
        (status = 401, description = "Unauthenticated", body = MessageResponse),
        (status = 404, description = "County not found", body = MessageResponse),
        (status = 422, description = "Invalid payload", body = MessageResponse)
    )
)]
pub async fn create_city(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    ApiPath(county_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<CreateCityRequest>,
) -> Result<(StatusCode, Json<CityMutationResponse>), ApiError> {
    let county = resolve_county(state.repo.as_ref(), county_id).await?;

    let req = CreateCityRequest {
        name: required_name(&payload.name)?,
        zip_code: valid_zip_code(payload.zip_code)?,
    };
    let city = match state.repo.create_city(county_id, req).await {
        Ok(city) => city,
        // County deleted after the lookup above.
        Err(RepositoryError::ForeignKeyViolation) => {
            return Err(ApiError::CountyNotFound);
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id, county_id, city_id = city.id, "city created");

    Ok((
        StatusCode::CREATED,
        Json(CityMutationResponse {
            message: "City created successfully".to_string(),
            city: CityView::project(city, &county),
        }),
    ))
}

/// modify_city
///
/// [Authenticated Route] Partial update of `name` and/or `zip_code`. The city
/// must belong to the county in the path.
#[utoipa::path(
    patch,
    path = "/counties/{county_id}/cities/{city_id}",
    params(
        ("county_id" = i64, Path, description = "County ID"),
        ("city_id" = i64, Path, description = "City ID")
    ),
    request_body = UpdateCityRequest,
    responses(
        (status = 200, description = "Updated", body = CityMutationResponse),
        (status = 401, description = "Unauthenticated", body = MessageResponse),
        (status = 404, description = "County or city not found", body = MessageResponse),
        (status = 422, description = "Invalid payload", body = MessageResponse)
    )
)]
pub async fn modify_city(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiPath((county_id, city_id)): ApiPath<(i64, i64)>,
    ApiJson(payload): ApiJson<UpdateCityRequest>,
) -> Result<Json<CityMutationResponse>, ApiError> {
    let (county, current) = resolve_city(state.repo.as_ref(), county_id, city_id).await?;

    let patch = UpdateCityRequest {
        name: payload.name.as_deref().map(required_name).transpose()?,
        zip_code: payload.zip_code.map(valid_zip_code).transpose()?,
    };
    let city = if patch.is_empty() {
        current
    } else {
        state
            .repo
            .update_city(county_id, city_id, patch)
            .await?
            .ok_or(ApiError::CityNotFound)?
    };

    Ok(Json(CityMutationResponse {
        message: "City updated successfully".to_string(),
        city: CityView::project(city, &county),
    }))
}

/// delete_city
///
/// [Authenticated Route] Removes one city of the given county.
#[utoipa::path(
    delete,
    path = "/counties/{county_id}/cities/{city_id}",
    params(
        ("county_id" = i64, Path, description = "County ID"),
        ("city_id" = i64, Path, description = "City ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 401, description = "Unauthenticated", body = MessageResponse),
        (status = 404, description = "County or city not found", body = MessageResponse)
    )
)]
pub async fn delete_city(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiPath((county_id, city_id)): ApiPath<(i64, i64)>,
) -> Result<Json<MessageResponse>, ApiError> {
    resolve_city(state.repo.as_ref(), county_id, city_id).await?;
    if !state.repo.delete_city(county_id, city_id).await? {
        return Err(ApiError::CityNotFound);
    }
    Ok(Json(MessageResponse::new("City deleted successfully")))
}

// --- Letter Index ---

/// county_letters
///
/// [Public Route] Distinct uppercase initials of the county's cities, in
/// Hungarian alphabetical order.
#[utoipa::path(
    get,
    path = "/counties/{county_id}/abc",
    params(("county_id" = i64, Path, description = "County ID")),
    responses(
        (status = 200, description = "Initial letters", body = LettersResponse),
        (status = 404, description = "County not found", body = MessageResponse)
    )
)]
pub async fn county_letters(
    State(state): State<AppState>,
    ApiPath(county_id): ApiPath<i64>,
) -> Result<Json<LettersResponse>, ApiError> {
    resolve_county(state.repo.as_ref(), county_id).await?;
    let names = state.repo.city_names(county_id).await?;
    let letters = collation::index_letters(&names, collation::hungarian_cmp);
    Ok(Json(LettersResponse { letters }))
}

/// cities_by_letter
///
/// [Public Route] Cities whose first character equals `letter`, ignoring case.
/// Store candidates are re-checked character by character, so lenient store
/// collations cannot leak extra rows into the result.
#[utoipa::path(
    get,
    path = "/counties/{county_id}/abc/{letter}",
    params(
        ("county_id" = i64, Path, description = "County ID"),
        ("letter" = String, Path, description = "Initial letter, case-insensitive")
    ),
    responses(
        (status = 200, description = "Matching cities", body = CityListResponse),
        (status = 404, description = "County not found", body = MessageResponse)
    )
)]
pub async fn cities_by_letter(
    State(state): State<AppState>,
    ApiPath((county_id, letter)): ApiPath<(i64, String)>,
) -> Result<Json<CityListResponse>, ApiError> {
    // Stored names are NFC; match the letter in the same form.
    let letter: String = letter.nfc().collect();
    let county = resolve_county(state.repo.as_ref(), county_id).await?;
    let candidates = state.repo.cities_by_initial(county_id, &letter).await?;
    let fetched = candidates.len();

    let cities: Vec<CityView> = candidates
        .into_iter()
        .filter(|city| collation::starts_with_letter(&city.name, &letter))
        .map(|city| CityView::project(city, &county))
        .collect();

    if cities.len() != fetched {
        tracing::debug!(
            county_id,
            %letter,
            discarded = fetched - cities.len(),
            "dropped prefix candidates that failed exact verification"
        );
    }
    Ok(Json(CityListResponse { cities }))
}

// --- Users ---

/// login
///
/// [Public Route] Exchanges email and password for a bearer token. Unknown
/// email and wrong password produce the same 401.
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid email or password", body = MessageResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let record = state.repo.find_user_by_email(payload.email.trim()).await?;
    let user = auth::verify_credentials(record, &payload.password)
        .inspect_err(|_| tracing::info!("failed login attempt"))?;
    let token = auth::issue_token(&state.config, user.id)?;
    tracing::info!(user_id = user.id, "user logged in");

    Ok(Json(LoginResponse {
        user: LoggedInUser {
            id: user.id,
            email: user.email,
            token,
        },
    }))
}

/// list_users
///
/// [Authenticated Route] All registered users without credentials.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users", body = UserListResponse),
        (status = 401, description = "Unauthenticated", body = MessageResponse)
    )
)]
pub async fn list_users(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserListResponse>, ApiError> {
    let users = state.repo.list_users().await?;
    Ok(Json(UserListResponse { users }))
}
