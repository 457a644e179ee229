//! `SQLite` implementation of [`CatalogRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use terminal_app::ports::CatalogRepository;
use terminal_domain::catalog::{
    ContractService, NewContractService, NewServiceType, NewTerminalService, ServiceType,
    TerminalService, normalize_price,
};
use terminal_domain::company::{Contract, NewContract};
use terminal_domain::error::{NotFoundError, TerminalError};
use terminal_domain::id::{
    CompanyId, ContractId, ContractServiceId, ServiceId, ServiceTypeId,
};

use crate::error::StorageError;
use crate::rows;

struct ServiceTypeRow(ServiceType);

impl<'r> FromRow<'r, SqliteRow> for ServiceTypeRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(ServiceType {
            id: ServiceTypeId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            unit_of_measure: rows::choice(row, "unit_of_measure")?,
        }))
    }
}

/// Decode a terminal service joined with its service type.
fn service_from_row(row: &SqliteRow) -> Result<TerminalService, sqlx::Error> {
    Ok(TerminalService {
        id: ServiceId::new(row.try_get("service_id")?),
        name: row.try_get("service_name")?,
        description: row.try_get("description")?,
        service_type: ServiceType {
            id: ServiceTypeId::new(row.try_get("service_type_id")?),
            name: row.try_get("service_type_name")?,
            unit_of_measure: rows::choice(row, "unit_of_measure")?,
        },
        container_size: rows::optional_choice(row, "container_size")?,
        container_state: rows::optional_choice(row, "container_state")?,
        base_price: rows::decimal(row, "base_price")?,
        multiple_usage: row.try_get("multiple_usage")?,
    })
}

struct ServiceRow(TerminalService);

impl<'r> FromRow<'r, SqliteRow> for ServiceRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        service_from_row(row).map(Self)
    }
}

struct ContractRow(Contract);

impl<'r> FromRow<'r, SqliteRow> for ContractRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Contract {
            id: ContractId::new(row.try_get("id")?),
            company_id: CompanyId::new(row.try_get("company_id")?),
            name: row.try_get("name")?,
            free_days: rows::count(row, "free_days")?,
            is_active: row.try_get("is_active")?,
        }))
    }
}

struct ContractServiceRow(ContractService);

impl<'r> FromRow<'r, SqliteRow> for ContractServiceRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(ContractService {
            id: ContractServiceId::new(row.try_get("id")?),
            contract_id: ContractId::new(row.try_get("contract_id")?),
            service: service_from_row(row)?,
            price: rows::decimal(row, "price")?,
        }))
    }
}

const INSERT_SERVICE_TYPE: &str = "INSERT INTO service_types (name, unit_of_measure) VALUES (?, ?)";
const SELECT_SERVICE_TYPE: &str = "SELECT id, name, unit_of_measure FROM service_types WHERE id = ?";
const SELECT_SERVICE_TYPES: &str = "SELECT id, name, unit_of_measure FROM service_types ORDER BY name";

const INSERT_SERVICE: &str = r"
    INSERT INTO terminal_services
        (name, description, service_type_id, container_size, container_state, base_price, multiple_usage)
    VALUES (?, ?, ?, ?, ?, ?, ?)
";

const SERVICE_COLUMNS: &str = r"
    s.id AS service_id, s.name AS service_name, s.description,
    st.id AS service_type_id, st.name AS service_type_name, st.unit_of_measure,
    s.container_size, s.container_state, s.base_price, s.multiple_usage
";

const INSERT_CONTRACT: &str =
    "INSERT INTO contracts (company_id, name, free_days, is_active) VALUES (?, ?, ?, ?)";
const DEACTIVATE_CONTRACTS: &str =
    "UPDATE contracts SET is_active = 0 WHERE company_id = ? AND is_active = 1";
const SELECT_CONTRACT: &str =
    "SELECT id, company_id, name, free_days, is_active FROM contracts WHERE id = ?";
const SELECT_ACTIVE_CONTRACT: &str = r"
    SELECT id, company_id, name, free_days, is_active FROM contracts
    WHERE company_id = ? AND is_active = 1
    ORDER BY id DESC
    LIMIT 1
";

const INSERT_CONTRACT_SERVICE: &str =
    "INSERT INTO contract_services (contract_id, service_id, price) VALUES (?, ?, ?)";

fn select_services(filter: &str) -> String {
    format!(
        "SELECT {SERVICE_COLUMNS} FROM terminal_services s \
         JOIN service_types st ON st.id = s.service_type_id {filter}"
    )
}

fn select_contract_services(filter: &str) -> String {
    format!(
        "SELECT cs.id, cs.contract_id, cs.price, {SERVICE_COLUMNS} FROM contract_services cs \
         JOIN terminal_services s ON s.id = cs.service_id \
         JOIN service_types st ON st.id = s.service_type_id {filter}"
    )
}

/// `SQLite`-backed catalog repository.
pub struct SqliteCatalogRepository {
    pool: SqlitePool,
}

impl SqliteCatalogRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn fetch_service(pool: &SqlitePool, id: ServiceId) -> Result<Option<TerminalService>, StorageError> {
    let row: Option<ServiceRow> = sqlx::query_as(&select_services("WHERE s.id = ?"))
        .bind(id.as_i64())
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| r.0))
}

async fn fetch_contract_service(
    pool: &SqlitePool,
    id: ContractServiceId,
) -> Result<Option<ContractService>, StorageError> {
    let row: Option<ContractServiceRow> =
        sqlx::query_as(&select_contract_services("WHERE cs.id = ?"))
            .bind(id.as_i64())
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|r| r.0))
}

impl CatalogRepository for SqliteCatalogRepository {
    fn create_service_type(
        &self,
        service_type: NewServiceType,
    ) -> impl Future<Output = Result<ServiceType, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(INSERT_SERVICE_TYPE)
                .bind(&service_type.name)
                .bind(service_type.unit_of_measure.as_str())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(ServiceType {
                id: ServiceTypeId::new(result.last_insert_rowid()),
                name: service_type.name,
                unit_of_measure: service_type.unit_of_measure,
            })
        }
    }

    fn get_service_type(
        &self,
        id: ServiceTypeId,
    ) -> impl Future<Output = Result<Option<ServiceType>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<ServiceTypeRow> = sqlx::query_as(SELECT_SERVICE_TYPE)
                .bind(id.as_i64())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|r| r.0))
        }
    }

    fn list_service_types(
        &self,
    ) -> impl Future<Output = Result<Vec<ServiceType>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<ServiceTypeRow> = sqlx::query_as(SELECT_SERVICE_TYPES)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|r| r.0).collect())
        }
    }

    fn create_service(
        &self,
        service: NewTerminalService,
    ) -> impl Future<Output = Result<TerminalService, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(INSERT_SERVICE)
                .bind(&service.name)
                .bind(&service.description)
                .bind(service.service_type_id.as_i64())
                .bind(service.container_size.map(|size| size.as_str()))
                .bind(service.container_state.map(|state| state.as_str()))
                .bind(normalize_price(service.base_price).to_string())
                .bind(service.multiple_usage)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            let id = ServiceId::new(result.last_insert_rowid());
            fetch_service(&pool, id).await?.ok_or_else(|| {
                NotFoundError {
                    entity: "Service",
                    id: id.to_string(),
                }
                .into()
            })
        }
    }

    fn get_service(
        &self,
        id: ServiceId,
    ) -> impl Future<Output = Result<Option<TerminalService>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move { Ok(fetch_service(&pool, id).await?) }
    }

    fn list_services(
        &self,
    ) -> impl Future<Output = Result<Vec<TerminalService>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<ServiceRow> = sqlx::query_as(&select_services("ORDER BY s.name, s.id"))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|r| r.0).collect())
        }
    }

    fn create_contract(
        &self,
        contract: NewContract,
    ) -> impl Future<Output = Result<Contract, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;

            if contract.is_active {
                sqlx::query(DEACTIVATE_CONTRACTS)
                    .bind(contract.company_id.as_i64())
                    .execute(&mut *tx)
                    .await
                    .map_err(StorageError::from)?;
            }
            let result = sqlx::query(INSERT_CONTRACT)
                .bind(contract.company_id.as_i64())
                .bind(&contract.name)
                .bind(i64::from(contract.free_days))
                .bind(contract.is_active)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;

            tx.commit().await.map_err(StorageError::from)?;

            Ok(Contract {
                id: ContractId::new(result.last_insert_rowid()),
                company_id: contract.company_id,
                name: contract.name,
                free_days: contract.free_days,
                is_active: contract.is_active,
            })
        }
    }

    fn get_contract(
        &self,
        id: ContractId,
    ) -> impl Future<Output = Result<Option<Contract>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<ContractRow> = sqlx::query_as(SELECT_CONTRACT)
                .bind(id.as_i64())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|r| r.0))
        }
    }

    fn find_active_contract(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Option<Contract>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<ContractRow> = sqlx::query_as(SELECT_ACTIVE_CONTRACT)
                .bind(company_id.as_i64())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|r| r.0))
        }
    }

    fn add_contract_service(
        &self,
        contract_service: NewContractService,
    ) -> impl Future<Output = Result<ContractService, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(INSERT_CONTRACT_SERVICE)
                .bind(contract_service.contract_id.as_i64())
                .bind(contract_service.service_id.as_i64())
                .bind(normalize_price(contract_service.price).to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            let id = ContractServiceId::new(result.last_insert_rowid());
            fetch_contract_service(&pool, id).await?.ok_or_else(|| {
                NotFoundError {
                    entity: "ContractService",
                    id: id.to_string(),
                }
                .into()
            })
        }
    }

    fn list_contract_services(
        &self,
        contract_id: ContractId,
    ) -> impl Future<Output = Result<Vec<ContractService>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<ContractServiceRow> = sqlx::query_as(&select_contract_services(
                "WHERE cs.contract_id = ? ORDER BY s.name, cs.id",
            ))
            .bind(contract_id.as_i64())
            .fetch_all(&pool)
            .await
            .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|r| r.0).collect())
        }
    }
}
