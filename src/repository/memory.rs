use super::{RepoResult, Repository};
use crate::{
    collation::starts_with_letter,
    error::RepositoryError,
    models::{
        City, County, CreateCityRequest, CreateCountyRequest, NewUser, UpdateCityRequest,
        UpdateCountyRequest, User, UserRecord,
    },
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    counties: BTreeMap<i64, County>,
    cities: BTreeMap<i64, City>,
    users: BTreeMap<i64, UserRecord>,
    next_county_id: i64,
    next_city_id: i64,
    next_user_id: i64,
}

impl Tables {
    fn bump(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// InMemoryRepository
///
/// `Repository` kept in process memory. Each operation runs under one lock
/// acquisition, and the `cities.county_id` foreign key is enforced the same
/// way the relational schema enforces it. Ids start at 1 and are never reused.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_counties(&self) -> RepoResult<Vec<County>> {
        Ok(self.tables.read().await.counties.values().cloned().collect())
    }

    async fn find_county_by_id(&self, id: i64) -> RepoResult<Option<County>> {
        Ok(self.tables.read().await.counties.get(&id).cloned())
    }

    async fn create_county(&self, req: CreateCountyRequest) -> RepoResult<County> {
        let mut tables = self.tables.write().await;
        let id = Tables::bump(&mut tables.next_county_id);
        let county = County { id, name: req.name };
        tables.counties.insert(id, county.clone());
        Ok(county)
    }

    async fn update_county(&self, id: i64, patch: UpdateCountyRequest) -> RepoResult<Option<County>> {
        let mut tables = self.tables.write().await;
        let Some(county) = tables.counties.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            county.name = name;
        }
        Ok(Some(county.clone()))
    }

    async fn delete_county(&self, id: i64) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.counties.contains_key(&id) {
            return Ok(false);
        }
        if tables.cities.values().any(|city| city.county_id == id) {
            return Err(RepositoryError::ForeignKeyViolation);
        }
        Ok(tables.counties.remove(&id).is_some())
    }

    async fn list_cities(&self, county_id: i64) -> RepoResult<Vec<City>> {
        let tables = self.tables.read().await;
        Ok(tables
            .cities
            .values()
            .filter(|city| city.county_id == county_id)
            .cloned()
            .collect())
    }

    async fn find_city_by_id_and_county(
        &self,
        county_id: i64,
        city_id: i64,
    ) -> RepoResult<Option<City>> {
        let tables = self.tables.read().await;
        Ok(tables
            .cities
            .get(&city_id)
            .filter(|city| city.county_id == county_id)
            .cloned())
    }

    async fn create_city(&self, county_id: i64, req: CreateCityRequest) -> RepoResult<City> {
        let mut tables = self.tables.write().await;
        if !tables.counties.contains_key(&county_id) {
            return Err(RepositoryError::ForeignKeyViolation);
        }
        let id = Tables::bump(&mut tables.next_city_id);
        let city = City {
            id,
            name: req.name,
            zip_code: req.zip_code,
            county_id,
        };
        tables.cities.insert(id, city.clone());
        Ok(city)
    }

    async fn update_city(
        &self,
        county_id: i64,
        city_id: i64,
        patch: UpdateCityRequest,
    ) -> RepoResult<Option<City>> {
        let mut tables = self.tables.write().await;
        let Some(city) = tables
            .cities
            .get_mut(&city_id)
            .filter(|city| city.county_id == county_id)
        else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            city.name = name;
        }
        if let Some(zip_code) = patch.zip_code {
            city.zip_code = zip_code;
        }
        Ok(Some(city.clone()))
    }

    async fn delete_city(&self, county_id: i64, city_id: i64) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.cities.get(&city_id) {
            Some(city) if city.county_id == county_id => {
                tables.cities.remove(&city_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn city_names(&self, county_id: i64) -> RepoResult<Vec<String>> {
        let tables = self.tables.read().await;
        Ok(tables
            .cities
            .values()
            .filter(|city| city.county_id == county_id)
            .map(|city| city.name.clone())
            .collect())
    }

    async fn cities_by_initial(&self, county_id: i64, letter: &str) -> RepoResult<Vec<City>> {
        let tables = self.tables.read().await;
        Ok(tables
            .cities
            .values()
            .filter(|city| city.county_id == county_id && starts_with_letter(&city.name, letter))
            .cloned()
            .collect())
    }

    async fn find_user_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned().map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().cloned().map(User::from).collect())
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.users.values().find(|u| u.email == user.email) {
            return Ok(User::from(existing.clone()));
        }
        let id = Tables::bump(&mut tables.next_user_id);
        let record = UserRecord {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
        };
        tables.users.insert(id, record.clone());
        Ok(User::from(record))
    }
}
