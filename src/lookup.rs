use crate::{
    error::ApiError,
    models::{City, County},
    repository::Repository,
};

/// resolve_county
///
/// Existence check every county-scoped operation runs before touching city data.
pub async fn resolve_county(repo: &dyn Repository, county_id: i64) -> Result<County, ApiError> {
    repo.find_county_by_id(county_id)
        .await?
        .ok_or(ApiError::CountyNotFound)
}

/// resolve_city
///
/// Resolves the county first, then a city that belongs to *that* county. A city
/// id that exists under another county is reported as not found.
pub async fn resolve_city(
    repo: &dyn Repository,
    county_id: i64,
    city_id: i64,
) -> Result<(County, City), ApiError> {
    let county = resolve_county(repo, county_id).await?;
    let city = repo
        .find_city_by_id_and_county(county_id, city_id)
        .await?
        .ok_or(ApiError::CityNotFound)?;
    Ok((county, city))
}
