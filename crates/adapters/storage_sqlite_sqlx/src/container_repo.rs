//! `SQLite` implementation of [`ContainerRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use terminal_app::ports::ContainerRepository;
use terminal_domain::container::Container;
use terminal_domain::error::TerminalError;
use terminal_domain::id::ContainerId;

use crate::error::StorageError;
use crate::rows;

/// Wrapper for converting database rows into domain [`Container`].
pub(crate) struct Wrapper(pub(crate) Container);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Container {
            id: ContainerId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            size: rows::choice(row, "size")?,
            in_storage: row.try_get("in_storage")?,
        }))
    }
}

const SELECT_BY_ID: &str = "SELECT id, name, size, in_storage FROM containers WHERE id = ?";
const SELECT_BY_NAME: &str = "SELECT id, name, size, in_storage FROM containers WHERE name = ?";

/// `SQLite`-backed container repository.
pub struct SqliteContainerRepository {
    pool: SqlitePool,
}

impl SqliteContainerRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ContainerRepository for SqliteContainerRepository {
    fn get_by_id(
        &self,
        id: ContainerId,
    ) -> impl Future<Output = Result<Option<Container>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.as_i64())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Container>, TerminalError>> + Send {
        let pool = self.pool.clone();
        let name = name.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_NAME)
                .bind(name)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use terminal_domain::choices::ContainerSize;

    use super::*;
    use crate::pool::Config;

    async fn setup() -> (SqliteContainerRepository, SqlitePool) {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        let pool = db.pool().clone();
        (SqliteContainerRepository::new(pool.clone()), pool)
    }

    async fn insert(pool: &SqlitePool, name: &str, size: ContainerSize, in_storage: bool) -> ContainerId {
        let result = sqlx::query("INSERT INTO containers (name, size, in_storage) VALUES (?, ?, ?)")
            .bind(name)
            .bind(size.as_str())
            .bind(in_storage)
            .execute(pool)
            .await
            .unwrap();
        ContainerId::new(result.last_insert_rowid())
    }

    #[tokio::test]
    async fn should_get_container_by_id() {
        let (repo, pool) = setup().await;
        let id = insert(&pool, "MSCU1234567", ContainerSize::Ft40HighCube, false).await;

        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "MSCU1234567");
        assert_eq!(fetched.size, ContainerSize::Ft40HighCube);
        assert!(!fetched.in_storage);
        assert!(repo.get_by_id(ContainerId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_find_container_by_name() {
        let (repo, pool) = setup().await;
        let id = insert(&pool, "MSCU1234567", ContainerSize::Ft20, true).await;

        let found = repo.find_by_name("MSCU1234567").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(found.in_storage);
        assert!(repo.find_by_name("TGHU7654321").await.unwrap().is_none());
    }
}
