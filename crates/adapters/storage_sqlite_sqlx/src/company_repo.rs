//! `SQLite` implementation of [`CompanyRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use terminal_app::ports::CompanyRepository;
use terminal_domain::company::Company;
use terminal_domain::error::TerminalError;
use terminal_domain::id::CompanyId;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Company`].
struct Wrapper(Company);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Company> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Company {
            id: CompanyId::new(row.try_get("id")?),
            name: row.try_get("name")?,
        }))
    }
}

const INSERT: &str = "INSERT INTO companies (name) VALUES (?)";
const SELECT_BY_ID: &str = "SELECT id, name FROM companies WHERE id = ?";
const SELECT_BY_NAME: &str = "SELECT id, name FROM companies WHERE name = ?";
const SELECT_ALL: &str = "SELECT id, name FROM companies ORDER BY name";

/// `SQLite`-backed company repository.
pub struct SqliteCompanyRepository {
    pool: SqlitePool,
}

impl SqliteCompanyRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl CompanyRepository for SqliteCompanyRepository {
    fn create(&self, name: String) -> impl Future<Output = Result<Company, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(INSERT)
                .bind(&name)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Company {
                id: CompanyId::new(result.last_insert_rowid()),
                name,
            })
        }
    }

    fn get_by_id(
        &self,
        id: CompanyId,
    ) -> impl Future<Output = Result<Option<Company>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.as_i64())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Company>, TerminalError>> + Send {
        let pool = self.pool.clone();
        let name = name.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_NAME)
                .bind(name)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Company>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}
