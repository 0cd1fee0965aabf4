//! SQLite Identification Method Repository

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::FromRow;

use super::{parse_id, DbPool};
use crate::application::ports::{MethodRepositoryPort, RepositoryError};
use crate::domain::archive::MethodId;
use crate::domain::identification::{IdentificationMethod, MethodSpec};

/// SQLite Identification Method Repository
pub struct SqliteMethodRepository {
    pool: DbPool,
}

impl SqliteMethodRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct MethodRow {
    id: String,
    name: String,
    description: Option<String>,
    date: Option<String>,
    url: Option<String>,
}

impl TryFrom<MethodRow> for IdentificationMethod {
    type Error = RepositoryError;

    fn try_from(row: MethodRow) -> Result<Self, Self::Error> {
        let date = row
            .date
            .as_deref()
            .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
            .transpose()
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        Ok(IdentificationMethod {
            id: parse_id(&row.id)?,
            name: row.name,
            description: row.description,
            date,
            url: row.url,
        })
    }
}

const SELECT_METHOD: &str = "SELECT id, name, description, date, url FROM identification_methods";

#[async_trait]
impl MethodRepositoryPort for SqliteMethodRepository {
    async fn ensure(&self, spec: &MethodSpec) -> Result<IdentificationMethod, RepositoryError> {
        let candidate = IdentificationMethod::from_spec(spec);

        // 名称冲突时保持已有行不变，依靠唯一约束处理并发插入
        sqlx::query(
            r#"
            INSERT INTO identification_methods (id, name, description, date, url, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(name) DO NOTHING
            "#,
        )
        .bind(candidate.id.to_string())
        .bind(&candidate.name)
        .bind(&candidate.description)
        .bind(candidate.date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(&candidate.url)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let method = self
            .find_by_name(spec.name())
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("method {}", spec.name())))?;

        if method.id == candidate.id {
            tracing::info!(method_id = %method.id, name = %method.name, "Created new identification method");
        } else {
            tracing::debug!(method_id = %method.id, name = %method.name, "Identification method already exists");
        }

        Ok(method)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<IdentificationMethod>, RepositoryError> {
        let row: Option<MethodRow> = sqlx::query_as(&format!("{} WHERE name = ?", SELECT_METHOD))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(IdentificationMethod::try_from).transpose()
    }

    async fn find_by_id(&self, id: MethodId) -> Result<Option<IdentificationMethod>, RepositoryError> {
        let row: Option<MethodRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_METHOD))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(IdentificationMethod::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<IdentificationMethod>, RepositoryError> {
        let rows: Vec<MethodRow> = sqlx::query_as(&format!("{} ORDER BY created_at, name", SELECT_METHOD))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(IdentificationMethod::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn repo() -> SqliteMethodRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteMethodRepository::new(pool)
    }

    #[tokio::test]
    async fn test_ensure_creates_once() {
        let repo = repo().await;
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let spec = MethodSpec::baseline(date);

        let first = repo.ensure(&spec).await.unwrap();
        let second = repo.ensure(&spec).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
        assert_eq!(first.date, Some(date));
    }

    #[tokio::test]
    async fn test_ensure_does_not_mutate_existing() {
        let repo = repo().await;
        let original = MethodSpec::new("Manual").unwrap().with_description("first");
        let changed = MethodSpec::new("Manual")
            .unwrap()
            .with_description("second")
            .with_url("https://example.org/methods/manual");

        let first = repo.ensure(&original).await.unwrap();
        let second = repo.ensure(&changed).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.description.as_deref(), Some("first"));
        assert_eq!(second.url, None);
    }

    #[tokio::test]
    async fn test_distinct_names_distinct_methods() {
        let repo = repo().await;
        let a = repo.ensure(&MethodSpec::new("A").unwrap()).await.unwrap();
        let b = repo.ensure(&MethodSpec::new("B").unwrap()).await.unwrap();
        assert_ne!(a.id, b.id);

        let found = repo.find_by_id(b.id).await.unwrap().unwrap();
        assert_eq!(found.name, "B");
        assert!(repo.find_by_name("C").await.unwrap().is_none());
    }
}
