//! `SQLite` implementation of [`ContainerVisitRepository`].
//!
//! A visit is stored as one `container_visits` row joined with its container,
//! company and contract; applied services and attachments live in child
//! tables and are loaded in bulk for a whole page.

use std::collections::HashMap;
use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, Sqlite, SqlitePool, Transaction};

use terminal_app::pagination::{LimitOffset, Page};
use terminal_app::ports::ContainerVisitRepository;
use terminal_app::query::VisitFilter;
use terminal_domain::catalog::ServiceType;
use terminal_domain::choices::{ContainerSize, VisitStatus};
use terminal_domain::company::Company;
use terminal_domain::container::Container;
use terminal_domain::error::{FieldErrors, NotFoundError, TerminalError, ValidationError};
use terminal_domain::id::{
    AppliedServiceId, AttachmentId, CompanyId, ContainerId, ContractId, ContractServiceId,
    ServiceId, ServiceTypeId, VisitId,
};
use terminal_domain::statistics::{SizeCount, TerminalStatistics};
use terminal_domain::time::{self, Timestamp};
use terminal_domain::visit::{
    AppliedService, Attachment, ContainerVisit, ContractTerms, NewAttachment, NewContainerVisit,
};

use crate::error::StorageError;
use crate::rows;

/// Visit row without its child collections.
struct VisitRow(ContainerVisit);

impl<'r> FromRow<'r, SqliteRow> for VisitRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let contract_id: Option<i64> = row.try_get("contract_id")?;
        let contract = match contract_id {
            Some(id) => Some(ContractTerms {
                id: ContractId::new(id),
                free_days: rows::count(row, "free_days")?,
            }),
            None => None,
        };

        Ok(Self(ContainerVisit {
            id: VisitId::new(row.try_get("id")?),
            container: Container {
                id: ContainerId::new(row.try_get("container_id")?),
                name: row.try_get("container_name")?,
                size: rows::choice(row, "container_size")?,
                in_storage: row.try_get("in_storage")?,
            },
            company: Company {
                id: CompanyId::new(row.try_get("company_id")?),
                name: row.try_get("company_name")?,
            },
            contract,
            container_state: rows::choice(row, "container_state")?,
            container_owner: row.try_get("container_owner")?,
            product_name: row.try_get("product_name")?,
            transport_type: rows::choice(row, "transport_type")?,
            transport_number: row.try_get("transport_number")?,
            exit_transport_type: rows::optional_choice(row, "exit_transport_type")?,
            exit_transport_number: row.try_get("exit_transport_number")?,
            entry_time: rows::timestamp(row, "entry_time")?,
            exit_time: rows::optional_timestamp(row, "exit_time")?,
            notes: row.try_get("notes")?,
            services: Vec::new(),
            images: Vec::new(),
            documents: Vec::new(),
        }))
    }
}

/// Applied service row, tagged with the visit it belongs to.
struct AppliedRow(VisitId, AppliedService);

impl<'r> FromRow<'r, SqliteRow> for AppliedRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(
            VisitId::new(row.try_get("visit_id")?),
            AppliedService {
                id: AppliedServiceId::new(row.try_get("id")?),
                contract_service_id: ContractServiceId::new(row.try_get("contract_service_id")?),
                service_id: ServiceId::new(row.try_get("service_id")?),
                name: row.try_get("service_name")?,
                service_type: ServiceType {
                    id: ServiceTypeId::new(row.try_get("service_type_id")?),
                    name: row.try_get("service_type_name")?,
                    unit_of_measure: rows::choice(row, "unit_of_measure")?,
                },
                container_size: rows::optional_choice(row, "container_size")?,
                base_price: rows::decimal(row, "base_price")?,
                price: rows::decimal(row, "price")?,
                date_from: rows::timestamp(row, "date_from")?,
                date_to: rows::optional_timestamp(row, "date_to")?,
                notes: row.try_get("notes")?,
                performed_at: row.try_get("performed_at")?,
            },
        ))
    }
}

struct AttachmentRow(Attachment);

impl<'r> FromRow<'r, SqliteRow> for AttachmentRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Attachment {
            id: AttachmentId::new(row.try_get("id")?),
            visit_id: VisitId::new(row.try_get("visit_id")?),
            name: row.try_get("name")?,
            url: row.try_get("url")?,
        }))
    }
}

const SELECT_VISITS: &str = r"
    SELECT v.id, v.container_id, c.name AS container_name, c.size AS container_size, c.in_storage,
           v.company_id, co.name AS company_name, v.contract_id, k.free_days,
           v.container_state, v.container_owner, v.product_name,
           v.transport_type, v.transport_number, v.exit_transport_type, v.exit_transport_number,
           v.entry_time, v.exit_time, v.notes
    FROM container_visits v
    JOIN containers c ON c.id = v.container_id
    JOIN companies co ON co.id = v.company_id
    LEFT JOIN contracts k ON k.id = v.contract_id
";

/// Storage days of a visit, with `?1` standing for "now".
const STORAGE_DAYS: &str = r"
    MAX(CAST(julianday(date(COALESCE(v.exit_time, ?1))) - julianday(date(v.entry_time)) AS INTEGER) + 1, 1)
";

/// Every [`VisitFilter`] criterion; a `NULL` parameter disables its clause.
const FILTER: &str = r"
    WHERE (?2 IS NULL OR v.company_id = ?2)
      AND (?3 IS NULL
           OR (?3 = 'in_terminal' AND v.exit_time IS NULL)
           OR (?3 = 'left_terminal' AND v.exit_time IS NOT NULL))
      AND (?4 IS NULL OR instr(lower(co.name), lower(?4)) > 0)
      AND (?5 IS NULL OR instr(lower(c.name), lower(?5)) > 0)
      AND (?6 IS NULL OR instr(',' || ?6 || ',', ',' || c.size || ',') > 0)
      AND (?7 IS NULL OR c.size = ?7)
      AND (?8 IS NULL OR v.container_state = ?8)
      AND (?9 IS NULL OR (v.container_state = 'empty') = ?9)
      AND (?10 IS NULL OR instr(lower(v.product_name), lower(?10)) > 0)
      AND (?11 IS NULL OR instr(lower(v.container_owner), lower(?11)) > 0)
      AND (?12 IS NULL OR lower(v.transport_type) = lower(?12))
      AND (?13 IS NULL OR instr(lower(v.transport_number), lower(?13)) > 0)
      AND (?14 IS NULL OR lower(v.exit_transport_type) = lower(?14))
      AND (?15 IS NULL OR instr(lower(v.exit_transport_number), lower(?15)) > 0)
      AND (?16 IS NULL OR EXISTS (
            SELECT 1 FROM visit_services vs
            JOIN contract_services cs ON cs.id = vs.contract_service_id
            JOIN terminal_services s ON s.id = cs.service_id
            WHERE vs.visit_id = v.id AND vs.date_to IS NULL
              AND instr(lower(s.name), lower(?16)) > 0))
      AND (?17 IS NULL OR EXISTS (
            SELECT 1 FROM visit_services vs
            JOIN contract_services cs ON cs.id = vs.contract_service_id
            JOIN terminal_services s ON s.id = cs.service_id
            WHERE vs.visit_id = v.id AND vs.date_to IS NOT NULL
              AND instr(lower(s.name), lower(?17)) > 0))
      AND (?18 IS NULL OR date(v.entry_time) >= ?18)
      AND (?19 IS NULL OR date(v.entry_time) <= ?19)
      AND (?20 IS NULL OR date(v.exit_time) >= ?20)
      AND (?21 IS NULL OR date(v.exit_time) <= ?21)
      AND (?22 IS NULL OR {storage_days} = ?22)
      AND (?23 IS NULL OR instr(lower(v.notes), lower(?23)) > 0)
";

const SELECT_SERVICES: &str = r"
    SELECT vs.id, vs.visit_id, vs.contract_service_id, cs.service_id,
           s.name AS service_name, st.id AS service_type_id, st.name AS service_type_name,
           st.unit_of_measure, s.container_size, s.base_price, vs.price,
           vs.date_from, vs.date_to, vs.notes, vs.performed_at
    FROM visit_services vs
    JOIN contract_services cs ON cs.id = vs.contract_service_id
    JOIN terminal_services s ON s.id = cs.service_id
    JOIN service_types st ON st.id = s.service_type_id
    WHERE vs.visit_id IN (SELECT value FROM json_each(?))
    ORDER BY vs.date_from, vs.id
";

const SELECT_IMAGES: &str = r"
    SELECT id, visit_id, name, url FROM visit_images
    WHERE visit_id IN (SELECT value FROM json_each(?))
    ORDER BY id
";

const SELECT_DOCUMENTS: &str = r"
    SELECT id, visit_id, name, url FROM visit_documents
    WHERE visit_id IN (SELECT value FROM json_each(?))
    ORDER BY id
";

const UPSERT_CONTAINER: &str = r"
    INSERT INTO containers (name, size, in_storage) VALUES (?, ?, 0)
    ON CONFLICT (name) DO UPDATE SET size = excluded.size
    RETURNING id
";

const INSERT_VISIT: &str = r"
    INSERT INTO container_visits
        (container_id, company_id, contract_id, container_state, container_owner, product_name,
         transport_type, transport_number, exit_transport_type, exit_transport_number,
         entry_time, exit_time, notes)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const INSERT_APPLIED_SERVICE: &str = r"
    INSERT INTO visit_services
        (visit_id, contract_service_id, price, date_from, date_to, notes, performed_at)
    SELECT ?1, cs.id, cs.price, ?3, ?4, ?5, ?6
    FROM contract_services cs WHERE cs.id = ?2
";

const SELECT_VISIT_STATE: &str =
    "SELECT container_id, exit_time IS NULL AS active FROM container_visits WHERE id = ?";
const CLAIM_CONTAINER: &str =
    "UPDATE containers SET in_storage = 1 WHERE id = ? AND in_storage = 0";
const RELEASE_CONTAINER: &str = "UPDATE containers SET in_storage = 0 WHERE id = ?";

const UPDATE_VISIT: &str = r"
    UPDATE container_visits
    SET container_id = ?, company_id = ?, contract_id = ?, container_state = ?,
        container_owner = ?, product_name = ?, transport_type = ?, transport_number = ?,
        exit_transport_type = ?, exit_transport_number = ?, entry_time = ?, exit_time = ?,
        notes = ?
    WHERE id = ?
";

const UPDATE_APPLIED_SERVICE: &str =
    "UPDATE visit_services SET date_to = ? WHERE id = ? AND visit_id = ?";
const DELETE_VISIT: &str = "DELETE FROM container_visits WHERE id = ?";

const INSERT_IMAGE: &str = "INSERT INTO visit_images (visit_id, name, url) VALUES (?, ?, ?)";
const DELETE_IMAGE: &str = "DELETE FROM visit_images WHERE id = ?";
const INSERT_DOCUMENT: &str = "INSERT INTO visit_documents (visit_id, name, url) VALUES (?, ?, ?)";
const DELETE_DOCUMENT: &str = "DELETE FROM visit_documents WHERE id = ?";

const SELECT_STATISTICS: &str = r"
    SELECT COUNT(*) AS total_visits,
           COALESCE(SUM(exit_time IS NULL), 0) AS in_terminal,
           COALESCE(SUM(exit_time IS NOT NULL), 0) AS left_terminal,
           COALESCE(SUM(exit_time IS NULL AND container_state = 'empty'), 0) AS empty_in_terminal,
           COALESCE(SUM(exit_time IS NULL AND container_state = 'loaded'), 0) AS loaded_in_terminal,
           COALESCE(SUM(date(entry_time) = date(?1)), 0) AS arrived_today,
           COALESCE(SUM(date(exit_time) = date(?1)), 0) AS dispatched_today
    FROM container_visits
";

const SELECT_SIZES_IN_TERMINAL: &str = r"
    SELECT c.size, COUNT(*) AS count
    FROM container_visits v
    JOIN containers c ON c.id = v.container_id
    WHERE v.exit_time IS NULL
    GROUP BY c.size
";

fn filter_clause() -> String {
    FILTER.replace("{storage_days}", STORAGE_DAYS)
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

fn date_text(date: Option<chrono::NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

/// Bind `?1..=?23` of [`FILTER`] in order.
fn bind_filter<'q, O>(
    query: sqlx::query::QueryAs<'q, Sqlite, O, sqlx::sqlite::SqliteArguments<'q>>,
    filter: &'q VisitFilter,
    now: Timestamp,
) -> sqlx::query::QueryAs<'q, Sqlite, O, sqlx::sqlite::SqliteArguments<'q>> {
    let status = match filter.status {
        VisitStatus::All => None,
        status => Some(status.as_str()),
    };
    let sizes = (!filter.container_sizes.is_empty()).then(|| {
        filter
            .container_sizes
            .iter()
            .map(|size| size.as_str())
            .collect::<Vec<_>>()
            .join(",")
    });

    query
        .bind(time::format(now))
        .bind(filter.company_id.map(CompanyId::as_i64))
        .bind(status)
        .bind(non_empty(filter.company_name.as_ref()))
        .bind(non_empty(filter.container_name.as_ref()))
        .bind(sizes)
        .bind(filter.container_size.map(ContainerSize::as_str))
        .bind(filter.container_state.map(|state| state.as_str()))
        .bind(filter.is_empty)
        .bind(non_empty(filter.product_name.as_ref()))
        .bind(non_empty(filter.container_owner.as_ref()))
        .bind(non_empty(filter.transport_type.as_ref()))
        .bind(non_empty(filter.transport_number.as_ref()))
        .bind(non_empty(filter.exit_transport_type.as_ref()))
        .bind(non_empty(filter.exit_transport_number.as_ref()))
        .bind(non_empty(filter.active_service.as_ref()))
        .bind(non_empty(filter.dispatch_service.as_ref()))
        .bind(date_text(filter.entry_date.from))
        .bind(date_text(filter.entry_date.to))
        .bind(date_text(filter.exit_date.from))
        .bind(date_text(filter.exit_date.to))
        .bind(filter.storage_days)
        .bind(non_empty(filter.notes.as_ref()))
}

/// Attach services, images and documents to already loaded visits.
async fn load_children(
    pool: &SqlitePool,
    visits: &mut [ContainerVisit],
) -> Result<(), StorageError> {
    if visits.is_empty() {
        return Ok(());
    }
    let ids = rows::id_list(visits.iter().map(|v| v.id.as_i64()));
    let index: HashMap<VisitId, usize> = visits
        .iter()
        .enumerate()
        .map(|(position, visit)| (visit.id, position))
        .collect();

    let services: Vec<AppliedRow> = sqlx::query_as(SELECT_SERVICES)
        .bind(&ids)
        .fetch_all(pool)
        .await?;
    for AppliedRow(visit_id, service) in services {
        if let Some(&position) = index.get(&visit_id) {
            visits[position].services.push(service);
        }
    }

    let images: Vec<AttachmentRow> = sqlx::query_as(SELECT_IMAGES)
        .bind(&ids)
        .fetch_all(pool)
        .await?;
    for AttachmentRow(image) in images {
        if let Some(&position) = index.get(&image.visit_id) {
            visits[position].images.push(image);
        }
    }

    let documents: Vec<AttachmentRow> = sqlx::query_as(SELECT_DOCUMENTS)
        .bind(&ids)
        .fetch_all(pool)
        .await?;
    for AttachmentRow(document) in documents {
        if let Some(&position) = index.get(&document.visit_id) {
            visits[position].documents.push(document);
        }
    }
    Ok(())
}

async fn fetch_visit(pool: &SqlitePool, id: VisitId) -> Result<Option<ContainerVisit>, StorageError> {
    let row: Option<VisitRow> = sqlx::query_as(&format!("{SELECT_VISITS} WHERE v.id = ?"))
        .bind(id.as_i64())
        .fetch_optional(pool)
        .await?;
    let Some(VisitRow(visit)) = row else {
        return Ok(None);
    };
    let mut visits = [visit];
    load_children(pool, &mut visits).await?;
    let [visit] = visits;
    Ok(Some(visit))
}

async fn fetch_visits(pool: &SqlitePool, ids: &[VisitId]) -> Result<Vec<ContainerVisit>, TerminalError> {
    let mut visits = Vec::with_capacity(ids.len());
    for &id in ids {
        let visit = fetch_visit(pool, id).await?.ok_or_else(|| NotFoundError {
            entity: "ContainerVisit",
            id: id.to_string(),
        })?;
        visits.push(visit);
    }
    Ok(visits)
}

/// Id of the container called `name`, created out of storage when missing.
async fn upsert_container(
    tx: &mut Transaction<'_, Sqlite>,
    name: &str,
    size: ContainerSize,
) -> Result<i64, StorageError> {
    let (id,): (i64,) = sqlx::query_as(UPSERT_CONTAINER)
        .bind(name)
        .bind(size.as_str())
        .fetch_one(&mut **tx)
        .await?;
    Ok(id)
}

/// Mark a container as in storage; `false` when another visit holds it.
async fn claim_container(
    tx: &mut Transaction<'_, Sqlite>,
    container_id: i64,
) -> Result<bool, StorageError> {
    let result = sqlx::query(CLAIM_CONTAINER)
        .bind(container_id)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected() == 1)
}

async fn release_container(
    tx: &mut Transaction<'_, Sqlite>,
    container_id: i64,
) -> Result<(), StorageError> {
    sqlx::query(RELEASE_CONTAINER)
        .bind(container_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

fn container_held() -> TerminalError {
    TerminalError::field("container_name", ValidationError::ContainerInStorage)
}

/// Insert one visit (and its container and services) inside `tx`.
async fn insert_visit(
    tx: &mut Transaction<'_, Sqlite>,
    visit: &NewContainerVisit,
) -> Result<VisitId, TerminalError> {
    let container_id = upsert_container(tx, &visit.container_name, visit.container_size).await?;
    if visit.is_active() && !claim_container(tx, container_id).await? {
        return Err(container_held());
    }

    let result = sqlx::query(INSERT_VISIT)
        .bind(container_id)
        .bind(visit.company_id.as_i64())
        .bind(visit.contract.map(|terms| terms.id.as_i64()))
        .bind(visit.container_state.as_str())
        .bind(&visit.container_owner)
        .bind(&visit.product_name)
        .bind(visit.transport_type.as_str())
        .bind(&visit.transport_number)
        .bind(visit.exit_transport_type.map(|kind| kind.as_str()))
        .bind(&visit.exit_transport_number)
        .bind(time::format(visit.entry_time))
        .bind(rows::optional_timestamp_text(visit.exit_time))
        .bind(&visit.notes)
        .execute(&mut **tx)
        .await
        .map_err(StorageError::from)?;
    let visit_id = result.last_insert_rowid();

    for service in &visit.services {
        let inserted = sqlx::query(INSERT_APPLIED_SERVICE)
            .bind(visit_id)
            .bind(service.contract_service_id.as_i64())
            .bind(time::format(service.date_from))
            .bind(rows::optional_timestamp_text(service.date_to))
            .bind(&service.notes)
            .bind(&service.performed_at)
            .execute(&mut **tx)
            .await
            .map_err(StorageError::from)?;
        if inserted.rows_affected() == 0 {
            return Err(StorageError::from(sqlx::Error::RowNotFound).into());
        }
    }

    Ok(VisitId::new(visit_id))
}

/// `SQLite`-backed container visit repository.
pub struct SqliteContainerVisitRepository {
    pool: SqlitePool,
}

impl SqliteContainerVisitRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ContainerVisitRepository for SqliteContainerVisitRepository {
    fn create(
        &self,
        visit: NewContainerVisit,
    ) -> impl Future<Output = Result<ContainerVisit, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            let id = insert_visit(&mut tx, &visit).await?;
            tx.commit().await.map_err(StorageError::from)?;

            let mut created = fetch_visits(&pool, &[id]).await?;
            created.pop().ok_or_else(|| {
                NotFoundError {
                    entity: "ContainerVisit",
                    id: id.to_string(),
                }
                .into()
            })
        }
    }

    fn create_many(
        &self,
        visits: Vec<NewContainerVisit>,
    ) -> impl Future<Output = Result<Vec<ContainerVisit>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            let mut ids = Vec::with_capacity(visits.len());
            for (index, visit) in visits.iter().enumerate() {
                match insert_visit(&mut tx, visit).await {
                    Ok(id) => ids.push(id),
                    Err(TerminalError::Validation(errors)) => {
                        let mut row_errors: Vec<FieldErrors> =
                            visits.iter().map(|_| FieldErrors::new()).collect();
                        row_errors[index] = errors;
                        return Err(TerminalError::BatchValidation(row_errors));
                    }
                    Err(err) => return Err(err),
                }
            }
            tx.commit().await.map_err(StorageError::from)?;

            fetch_visits(&pool, &ids).await
        }
    }

    fn get_by_id(
        &self,
        id: VisitId,
    ) -> impl Future<Output = Result<Option<ContainerVisit>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move { Ok(fetch_visit(&pool, id).await?) }
    }

    fn update(
        &self,
        visit: ContainerVisit,
    ) -> impl Future<Output = Result<ContainerVisit, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;

            let current: Option<(i64, bool)> = sqlx::query_as(SELECT_VISIT_STATE)
                .bind(visit.id.as_i64())
                .fetch_optional(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            let Some((previous_container, was_active)) = current else {
                return Err(NotFoundError {
                    entity: "ContainerVisit",
                    id: visit.id.to_string(),
                }
                .into());
            };

            let container_id =
                upsert_container(&mut tx, &visit.container.name, visit.container.size).await?;
            let moved = container_id != previous_container;
            let active = visit.is_active();
            if was_active && (moved || !active) {
                release_container(&mut tx, previous_container).await?;
            }
            if active && (moved || !was_active) && !claim_container(&mut tx, container_id).await? {
                return Err(container_held());
            }

            sqlx::query(UPDATE_VISIT)
                .bind(container_id)
                .bind(visit.company.id.as_i64())
                .bind(visit.contract.map(|terms| terms.id.as_i64()))
                .bind(visit.container_state.as_str())
                .bind(&visit.container_owner)
                .bind(&visit.product_name)
                .bind(visit.transport_type.as_str())
                .bind(&visit.transport_number)
                .bind(visit.exit_transport_type.map(|kind| kind.as_str()))
                .bind(&visit.exit_transport_number)
                .bind(time::format(visit.entry_time))
                .bind(rows::optional_timestamp_text(visit.exit_time))
                .bind(&visit.notes)
                .bind(visit.id.as_i64())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;

            for service in &visit.services {
                sqlx::query(UPDATE_APPLIED_SERVICE)
                    .bind(rows::optional_timestamp_text(service.date_to))
                    .bind(service.id.as_i64())
                    .bind(visit.id.as_i64())
                    .execute(&mut *tx)
                    .await
                    .map_err(StorageError::from)?;
            }

            tx.commit().await.map_err(StorageError::from)?;

            Ok(fetch_visit(&pool, visit.id).await?.unwrap_or(visit))
        }
    }

    fn delete(&self, id: VisitId) -> impl Future<Output = Result<(), TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;

            let current: Option<(i64, bool)> = sqlx::query_as(SELECT_VISIT_STATE)
                .bind(id.as_i64())
                .fetch_optional(&mut *tx)
                .await
                .map_err(StorageError::from)?;

            sqlx::query(DELETE_VISIT)
                .bind(id.as_i64())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;

            if let Some((container_id, true)) = current {
                release_container(&mut tx, container_id).await?;
            }

            tx.commit().await.map_err(StorageError::from)?;
            Ok(())
        }
    }

    fn list(
        &self,
        filter: VisitFilter,
        page: LimitOffset,
        now: Timestamp,
    ) -> impl Future<Output = Result<Page<ContainerVisit>, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let clause = filter_clause();

            let count_sql = format!(
                "SELECT COUNT(*) FROM container_visits v \
                 JOIN containers c ON c.id = v.container_id \
                 JOIN companies co ON co.id = v.company_id {clause}"
            );
            let (count,): (i64,) = bind_filter(sqlx::query_as(&count_sql), &filter, now)
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;

            let select_sql = format!(
                "{SELECT_VISITS} {clause} ORDER BY v.entry_time DESC, v.id DESC LIMIT ?24 OFFSET ?25"
            );
            let rows: Vec<VisitRow> = bind_filter(sqlx::query_as(&select_sql), &filter, now)
                .bind(i64::from(page.limit))
                .bind(i64::try_from(page.offset).unwrap_or(i64::MAX))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            let mut results: Vec<ContainerVisit> = rows.into_iter().map(|r| r.0).collect();
            load_children(&pool, &mut results).await?;

            Ok(Page {
                count: u64::try_from(count).unwrap_or(0),
                limit: page.limit,
                offset: page.offset,
                results,
            })
        }
    }

    fn statistics(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<TerminalStatistics, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let sizes: Vec<(String, i64)> = sqlx::query_as(SELECT_SIZES_IN_TERMINAL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            let row = sqlx::query(SELECT_STATISTICS)
                .bind(time::format(now))
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;
            let get = |column: &str| -> Result<i64, StorageError> { Ok(row.try_get(column)?) };

            let by_size: HashMap<String, i64> = sizes.into_iter().collect();
            let in_terminal_by_size = ContainerSize::ALL
                .iter()
                .filter_map(|&size| {
                    by_size
                        .get(size.as_str())
                        .map(|&count| SizeCount { size, count })
                })
                .collect();

            Ok(TerminalStatistics {
                total_visits: get("total_visits")?,
                in_terminal: get("in_terminal")?,
                left_terminal: get("left_terminal")?,
                empty_in_terminal: get("empty_in_terminal")?,
                loaded_in_terminal: get("loaded_in_terminal")?,
                in_terminal_by_size,
                arrived_today: get("arrived_today")?,
                dispatched_today: get("dispatched_today")?,
            })
        }
    }

    fn add_image(
        &self,
        visit_id: VisitId,
        image: NewAttachment,
    ) -> impl Future<Output = Result<Attachment, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move { Ok(insert_attachment(&pool, INSERT_IMAGE, visit_id, image).await?) }
    }

    fn remove_image(
        &self,
        id: AttachmentId,
    ) -> impl Future<Output = Result<bool, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move { Ok(delete_attachment(&pool, DELETE_IMAGE, id).await?) }
    }

    fn add_document(
        &self,
        visit_id: VisitId,
        document: NewAttachment,
    ) -> impl Future<Output = Result<Attachment, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move { Ok(insert_attachment(&pool, INSERT_DOCUMENT, visit_id, document).await?) }
    }

    fn remove_document(
        &self,
        id: AttachmentId,
    ) -> impl Future<Output = Result<bool, TerminalError>> + Send {
        let pool = self.pool.clone();
        async move { Ok(delete_attachment(&pool, DELETE_DOCUMENT, id).await?) }
    }
}

async fn insert_attachment(
    pool: &SqlitePool,
    sql: &str,
    visit_id: VisitId,
    attachment: NewAttachment,
) -> Result<Attachment, StorageError> {
    let result = sqlx::query(sql)
        .bind(visit_id.as_i64())
        .bind(&attachment.name)
        .bind(&attachment.url)
        .execute(pool)
        .await?;

    Ok(Attachment {
        id: AttachmentId::new(result.last_insert_rowid()),
        visit_id,
        name: attachment.name,
        url: attachment.url,
    })
}

async fn delete_attachment(pool: &SqlitePool, sql: &str, id: AttachmentId) -> Result<bool, StorageError> {
    let result = sqlx::query(sql).bind(id.as_i64()).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
