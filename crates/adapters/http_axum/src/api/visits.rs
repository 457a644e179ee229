//! JSON REST handlers for a single container visit: registration, update,
//! dispatch, removal and the details view.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use terminal_app::commands::{DispatchVisit, RegisterVisit, UpdateVisit};
use terminal_app::ports::{
    CatalogRepository, CompanyRepository, ContainerRepository, ContainerVisitRepository,
};
use terminal_domain::container;
use terminal_domain::error::{TerminalError, ValidationError};
use terminal_domain::id::{CompanyId, ContractServiceId, VisitId};
use terminal_domain::time;
use terminal_domain::visit::ServiceUsage;

use super::fields::{Fields, Text, blank_or_choice, choice, datetime, integer};
use super::parse_id;
use super::representation::{AvailableServiceView, RegisteredVisit, VisitView};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Possible responses from the register endpoint.
pub enum RegisterResponse {
    Created(Json<RegisteredVisit>),
}

impl IntoResponse for RegisterResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from endpoints returning one visit in full.
pub enum DetailResponse {
    Ok(Json<VisitView>),
}

impl IntoResponse for DetailResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Possible responses from the available services endpoint.
pub enum AvailableServicesResponse {
    Ok(Json<Vec<AvailableServiceView>>),
}

impl IntoResponse for AvailableServicesResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

fn blank_text(value: &Value) -> Result<String, ValidationError> {
    Text::new().blank_ok().parse(value)
}

fn service_usages(fields: &mut Fields<'_>, items: &[Value]) -> Vec<ServiceUsage> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let mut nested = Fields::nested(item, "services", index);
            let id = nested.required("id", integer);
            let date_from = nested.optional("date_from", datetime);
            let date_to = nested.nullable("date_to", false, datetime).flatten();
            let notes = nested.nullable("notes", false, blank_text).flatten();
            let performed_at = nested.nullable("performed_at", false, blank_text).flatten();
            fields.absorb(nested);
            id.map(|id| ServiceUsage {
                contract_service_id: ContractServiceId::new(id),
                date_from,
                date_to,
                notes,
                performed_at,
            })
        })
        .collect()
}

fn register_command(body: &Value) -> Result<RegisterVisit, TerminalError> {
    let mut fields = Fields::new(body);
    let container_name = fields.required("container_name", |v| {
        Text::new().max_len(container::MAX_NAME_LEN).parse(v)
    });
    let container_size = fields.required("container_size", choice);
    let container_state = fields.required("container_state", choice);
    let container_owner = fields.required("container_owner", blank_text);
    let product_name = fields.nullable("product_name", true, blank_text);
    let transport_type = fields.required("transport_type", choice);
    let transport_number = fields.required("transport_number", blank_text);
    let company_id = fields.required("company_id", integer);
    let entry_time = fields.required("entry_time", datetime);
    let notes = fields.nullable("notes", false, blank_text).flatten();
    let services = fields
        .list("services")
        .map(|items| service_usages(&mut fields, items));

    let (
        Some(container_name),
        Some(container_size),
        Some(container_state),
        Some(container_owner),
        Some(product_name),
        Some(transport_type),
        Some(transport_number),
        Some(company_id),
        Some(entry_time),
        Some(services),
    ) = (
        container_name,
        container_size,
        container_state,
        container_owner,
        product_name,
        transport_type,
        transport_number,
        company_id,
        entry_time,
        services,
    )
    else {
        return Err(fields.into_error());
    };
    fields.finish()?;

    Ok(RegisterVisit {
        container_name,
        container_size,
        company_id: CompanyId::new(company_id),
        container_state,
        container_owner,
        product_name,
        transport_type,
        transport_number,
        entry_time,
        notes,
        services,
    })
}

fn update_command(body: &Value) -> Result<UpdateVisit, TerminalError> {
    let mut fields = Fields::new(body);
    let container_name = fields.required("container_name", |v| {
        Text::new().max_len(container::MAX_NAME_LEN).parse(v)
    });
    let container_size = fields.required("container_size", choice);
    let company_id = fields.required("company_id", integer);
    let container_state = fields.optional("container_state", choice);
    let container_owner = fields.optional("container_owner", |v| Text::new().parse(v));
    let transport_type = fields.optional("transport_type", choice);
    let product_name = fields.nullable("product_name", false, blank_text);
    let transport_number = fields.optional("transport_number", |v| Text::new().parse(v));
    let exit_transport_type = fields.optional("exit_transport_type", blank_or_choice);
    let exit_transport_number = fields.nullable("exit_transport_number", false, blank_text);
    let entry_time = fields.optional("entry_time", datetime);
    let exit_time = fields.nullable("exit_time", false, datetime);
    let notes = fields.nullable("notes", false, blank_text);

    let (Some(container_name), Some(container_size), Some(company_id)) =
        (container_name, container_size, company_id)
    else {
        return Err(fields.into_error());
    };
    fields.finish()?;

    Ok(UpdateVisit {
        container_state,
        container_owner,
        product_name,
        transport_type,
        transport_number,
        exit_transport_type,
        exit_transport_number,
        entry_time,
        exit_time,
        notes,
        ..UpdateVisit::new(container_name, container_size, CompanyId::new(company_id))
    })
}

fn dispatch_command(body: &Value) -> Result<DispatchVisit, TerminalError> {
    let mut fields = Fields::new(body);
    let exit_time = fields.required("exit_time", datetime);
    let exit_transport_type = fields.required("exit_transport_type", choice);
    let exit_transport_number =
        fields.required("exit_transport_number", |v| Text::new().parse(v));

    let (Some(exit_time), Some(exit_transport_type), Some(exit_transport_number)) =
        (exit_time, exit_transport_type, exit_transport_number)
    else {
        return Err(fields.into_error());
    };

    Ok(DispatchVisit {
        exit_time,
        exit_transport_type,
        exit_transport_number,
    })
}

/// `POST /api/container_visit_register`
pub async fn register<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    ApiJson(body): ApiJson<Value>,
) -> Result<RegisterResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let cmd = register_command(&body)?;
    let visit = state.storage_service.register_container_entry(cmd).await?;
    Ok(RegisterResponse::Created(Json(RegisteredVisit::from(
        &visit,
    ))))
}

/// `PUT /api/container_visit/{visit_id}/update`
pub async fn update<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(visit_id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<DetailResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let id: VisitId = parse_id(&visit_id, "ContainerVisit")?;
    let cmd = update_command(&body)?;
    let visit = state
        .storage_service
        .update_container_visit(id, cmd)
        .await?;
    Ok(DetailResponse::Ok(Json(VisitView::detail(
        &visit,
        time::now(),
    ))))
}

/// `DELETE /api/container_visit/{visit_id}/delete`
pub async fn delete<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(visit_id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let id: VisitId = parse_id(&visit_id, "ContainerVisit")?;
    state.storage_service.delete_container_visit(id).await?;
    Ok(DeleteResponse::NoContent)
}

/// `PUT /api/container_visit/{visit_id}/dispatch`
pub async fn dispatch<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(visit_id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<DetailResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let id: VisitId = parse_id(&visit_id, "ContainerVisit")?;
    let cmd = dispatch_command(&body)?;
    let visit = state
        .storage_service
        .dispatch_container_visit(id, cmd)
        .await?;
    Ok(DetailResponse::Ok(Json(VisitView::detail(
        &visit,
        time::now(),
    ))))
}

/// `GET /api/container_visit/{visit_id}/available_services`
pub async fn available_services<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(visit_id): Path<String>,
) -> Result<AvailableServicesResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let id: VisitId = parse_id(&visit_id, "ContainerVisit")?;
    let services = state.storage_service.get_available_services(id).await?;
    Ok(AvailableServicesResponse::Ok(Json(
        services.into_iter().map(AvailableServiceView::from).collect(),
    )))
}

/// `GET /api/container_visit_list/{visit_id}`
pub async fn detail<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(visit_id): Path<String>,
) -> Result<DetailResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let id: VisitId = parse_id(&visit_id, "ContainerVisit")?;
    let visit = state.storage_service.get_container_visit(id).await?;
    Ok(DetailResponse::Ok(Json(VisitView::detail(
        &visit,
        time::now(),
    ))))
}
