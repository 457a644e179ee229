//! JSON REST handlers for the pricing catalog: service types, terminal
//! services, contracts and contract prices.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use terminal_app::ports::{
    CatalogRepository, CompanyRepository, ContainerRepository, ContainerVisitRepository,
};
use terminal_domain::catalog::{
    ContractService, NewContractService, NewServiceType, NewTerminalService, ServiceType,
    TerminalService,
};
use terminal_domain::company::{self, Contract, NewContract};
use terminal_domain::error::TerminalError;
use terminal_domain::id::{CompanyId, ContractId, ServiceId, ServiceTypeId};

use super::fields::{Fields, Text, boolean, choice, decimal, integer, non_negative};
use super::parse_id;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// A JSON body answered with `200 OK`.
pub enum OkResponse<T> {
    Ok(Json<T>),
}

impl<T: Serialize> IntoResponse for OkResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// A JSON body answered with `201 Created`.
pub enum CreateResponse<T> {
    Created(Json<T>),
}

impl<T: Serialize> IntoResponse for CreateResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

fn service_type_request(body: &Value) -> Result<NewServiceType, TerminalError> {
    let mut fields = Fields::new(body);
    let name = fields.required("name", |v| Text::new().max_len(255).parse(v));
    let unit_of_measure = fields.required("unit_of_measure", choice);
    let (Some(name), Some(unit_of_measure)) = (name, unit_of_measure) else {
        return Err(fields.into_error());
    };
    Ok(NewServiceType {
        name,
        unit_of_measure,
    })
}

fn service_request(body: &Value) -> Result<NewTerminalService, TerminalError> {
    let mut fields = Fields::new(body);
    let name = fields.required("name", |v| Text::new().max_len(255).parse(v));
    let description = fields.optional("description", |v| Text::new().blank_ok().parse(v));
    let service_type_id = fields.required("service_type_id", integer);
    let container_size = fields.nullable("container_size", false, choice).flatten();
    let container_state = fields.nullable("container_state", false, choice).flatten();
    let base_price = fields.required("base_price", decimal);
    let multiple_usage = fields.optional("multiple_usage", boolean);

    let (Some(name), Some(service_type_id), Some(base_price)) = (name, service_type_id, base_price)
    else {
        return Err(fields.into_error());
    };
    fields.finish()?;

    Ok(NewTerminalService {
        name,
        description: description.unwrap_or_default(),
        service_type_id: ServiceTypeId::new(service_type_id),
        container_size,
        container_state,
        base_price,
        multiple_usage: multiple_usage.unwrap_or(false),
    })
}

fn contract_request(body: &Value) -> Result<NewContract, TerminalError> {
    let mut fields = Fields::new(body);
    let company_id = fields.required("company_id", integer);
    let name = fields.required("name", |v| {
        Text::new().max_len(company::MAX_NAME_LEN).parse(v)
    });
    let free_days = fields.optional("free_days", non_negative);
    let is_active = fields.optional("is_active", boolean);

    let (Some(company_id), Some(name)) = (company_id, name) else {
        return Err(fields.into_error());
    };
    fields.finish()?;

    Ok(NewContract {
        company_id: CompanyId::new(company_id),
        name,
        free_days: free_days.unwrap_or(0),
        is_active: is_active.unwrap_or(true),
    })
}

fn contract_service_request(
    contract_id: ContractId,
    body: &Value,
) -> Result<NewContractService, TerminalError> {
    let mut fields = Fields::new(body);
    let service_id = fields.required("service_id", integer);
    let price = fields.required("price", decimal);
    let (Some(service_id), Some(price)) = (service_id, price) else {
        return Err(fields.into_error());
    };
    Ok(NewContractService {
        contract_id,
        service_id: ServiceId::new(service_id),
        price,
    })
}

/// `GET /api/service_types`
pub async fn list_service_types<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
) -> Result<OkResponse<Vec<ServiceType>>, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let types = state.catalog_service.list_service_types().await?;
    Ok(OkResponse::Ok(Json(types)))
}

/// `POST /api/service_types`
pub async fn create_service_type<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    ApiJson(body): ApiJson<Value>,
) -> Result<CreateResponse<ServiceType>, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let request = service_type_request(&body)?;
    let service_type = state.catalog_service.create_service_type(request).await?;
    Ok(CreateResponse::Created(Json(service_type)))
}

/// `GET /api/services`
pub async fn list_services<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
) -> Result<OkResponse<Vec<TerminalService>>, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let services = state.catalog_service.list_services().await?;
    Ok(OkResponse::Ok(Json(services)))
}

/// `POST /api/services`
pub async fn create_service<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    ApiJson(body): ApiJson<Value>,
) -> Result<CreateResponse<TerminalService>, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let request = service_request(&body)?;
    let service = state.catalog_service.create_service(request).await?;
    Ok(CreateResponse::Created(Json(service)))
}

/// `POST /api/contracts`
pub async fn create_contract<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    ApiJson(body): ApiJson<Value>,
) -> Result<CreateResponse<Contract>, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let request = contract_request(&body)?;
    let contract = state.catalog_service.create_contract(request).await?;
    Ok(CreateResponse::Created(Json(contract)))
}

/// `GET /api/contracts/{id}`
pub async fn get_contract<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(id): Path<String>,
) -> Result<OkResponse<Contract>, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let id: ContractId = parse_id(&id, "Contract")?;
    let contract = state.catalog_service.get_contract(id).await?;
    Ok(OkResponse::Ok(Json(contract)))
}

/// `GET /api/contracts/{id}/services`
pub async fn list_contract_services<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(id): Path<String>,
) -> Result<OkResponse<Vec<ContractService>>, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let id: ContractId = parse_id(&id, "Contract")?;
    let services = state.catalog_service.list_contract_services(id).await?;
    Ok(OkResponse::Ok(Json(services)))
}

/// `POST /api/contracts/{id}/services`
pub async fn add_contract_service<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<CreateResponse<ContractService>, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let id: ContractId = parse_id(&id, "Contract")?;
    let request = contract_service_request(id, &body)?;
    let price = state.catalog_service.add_contract_service(request).await?;
    Ok(CreateResponse::Created(Json(price)))
}
