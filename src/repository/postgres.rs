use super::{RepoResult, Repository};
use crate::{
    collation::escape_like,
    error::RepositoryError,
    models::{
        City, County, CreateCityRequest, CreateCountyRequest, NewUser, UpdateCityRequest,
        UpdateCountyRequest, User, UserRecord,
    },
};
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL. Referential integrity is enforced by the
/// schema's foreign key; violations surface as `ForeignKeyViolation`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the SQL files under `migrations/`.
    pub async fn migrate(&self) -> RepoResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Translates driver errors, singling out foreign key violations (SQLSTATE 23503).
fn map_err(op: &'static str, e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() {
            tracing::debug!(op, "foreign key violation: {}", db.message());
            return RepositoryError::ForeignKeyViolation;
        }
    }
    tracing::error!(op, "postgres error: {:?}", e);
    RepositoryError::Database(e)
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_counties(&self) -> RepoResult<Vec<County>> {
        sqlx::query_as::<_, County>("SELECT id, name FROM counties ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_err("list_counties", e))
    }

    async fn find_county_by_id(&self, id: i64) -> RepoResult<Option<County>> {
        sqlx::query_as::<_, County>("SELECT id, name FROM counties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_err("find_county_by_id", e))
    }

    async fn create_county(&self, req: CreateCountyRequest) -> RepoResult<County> {
        sqlx::query_as::<_, County>("INSERT INTO counties (name) VALUES ($1) RETURNING id, name")
            .bind(req.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_err("create_county", e))
    }

    /// update_county
    ///
    /// `COALESCE` keeps the stored value for every field absent from the patch.
    async fn update_county(&self, id: i64, patch: UpdateCountyRequest) -> RepoResult<Option<County>> {
        sqlx::query_as::<_, County>(
            r#"
            UPDATE counties
            SET name = COALESCE($2, name)
            WHERE id = $1
            RETURNING id, name
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_err("update_county", e))
    }

    async fn delete_county(&self, id: i64) -> RepoResult<bool> {
        sqlx::query("DELETE FROM counties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|res| res.rows_affected() > 0)
            .map_err(|e| map_err("delete_county", e))
    }

    async fn list_cities(&self, county_id: i64) -> RepoResult<Vec<City>> {
        sqlx::query_as::<_, City>(
            "SELECT id, name, zip_code, county_id FROM cities WHERE county_id = $1 ORDER BY id",
        )
        .bind(county_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_err("list_cities", e))
    }

    async fn find_city_by_id_and_county(
        &self,
        county_id: i64,
        city_id: i64,
    ) -> RepoResult<Option<City>> {
        sqlx::query_as::<_, City>(
            "SELECT id, name, zip_code, county_id FROM cities WHERE id = $1 AND county_id = $2",
        )
        .bind(city_id)
        .bind(county_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_err("find_city_by_id_and_county", e))
    }

    async fn create_city(&self, county_id: i64, req: CreateCityRequest) -> RepoResult<City> {
        sqlx::query_as::<_, City>(
            r#"
            INSERT INTO cities (name, zip_code, county_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, zip_code, county_id
            "#,
        )
        .bind(req.name)
        .bind(req.zip_code)
        .bind(county_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_err("create_city", e))
    }

    /// update_city
    ///
    /// Only `name` and `zip_code` are touched; `county_id` is part of the match.
    async fn update_city(
        &self,
        county_id: i64,
        city_id: i64,
        patch: UpdateCityRequest,
    ) -> RepoResult<Option<City>> {
        sqlx::query_as::<_, City>(
            r#"
            UPDATE cities
            SET name = COALESCE($3, name),
                zip_code = COALESCE($4, zip_code)
            WHERE id = $1 AND county_id = $2
            RETURNING id, name, zip_code, county_id
            "#,
        )
        .bind(city_id)
        .bind(county_id)
        .bind(patch.name)
        .bind(patch.zip_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_err("update_city", e))
    }

    async fn delete_city(&self, county_id: i64, city_id: i64) -> RepoResult<bool> {
        sqlx::query("DELETE FROM cities WHERE id = $1 AND county_id = $2")
            .bind(city_id)
            .bind(county_id)
            .execute(&self.pool)
            .await
            .map(|res| res.rows_affected() > 0)
            .map_err(|e| map_err("delete_city", e))
    }

    async fn city_names(&self, county_id: i64) -> RepoResult<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT name FROM cities WHERE county_id = $1 ORDER BY id")
            .bind(county_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_err("city_names", e))
    }

    /// cities_by_initial
    ///
    /// Candidate selection through `ILIKE`. The letter is escaped so `%` or `_`
    /// in the path cannot widen the match.
    async fn cities_by_initial(&self, county_id: i64, letter: &str) -> RepoResult<Vec<City>> {
        let pattern = format!("{}%", escape_like(letter));
        sqlx::query_as::<_, City>(
            r#"
            SELECT id, name, zip_code, county_id
            FROM cities
            WHERE county_id = $1 AND name ILIKE $2
            ORDER BY id
            "#,
        )
        .bind(county_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_err("cities_by_initial", e))
    }

    async fn find_user_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_err("find_user_by_id", e))
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_err("find_user_by_email", e))
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT id, name, email FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_err("list_users", e))
    }

    /// create_user
    ///
    /// The no-op `DO UPDATE` makes `RETURNING` yield the existing row on conflict.
    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id, name, email
            "#,
        )
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_err("create_user", e))
    }
}
