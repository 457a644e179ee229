//! JSON REST handlers for visit images and documents.
//!
//! Only metadata is stored: a display name and the URL where the file lives.
//! The download endpoints hand out those URLs; clients fetch the files
//! from object storage themselves.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use terminal_app::ports::{
    CatalogRepository, CompanyRepository, ContainerRepository, ContainerVisitRepository,
};
use terminal_domain::error::TerminalError;
use terminal_domain::id::{AttachmentId, VisitId};
use terminal_domain::visit::NewAttachment;

use super::fields::{Fields, Text};
use super::parse_id;
use super::representation::{DocumentView, ImageView};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Possible responses from the image create endpoint.
pub enum ImageResponse {
    Created(Json<ImageView>),
}

impl IntoResponse for ImageResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the document create endpoint.
pub enum DocumentResponse {
    Created(Json<DocumentView>),
}

impl IntoResponse for DocumentResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the image download endpoint.
pub enum ImageListResponse {
    Ok(Json<Vec<ImageView>>),
}

impl IntoResponse for ImageListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the document download endpoint.
pub enum DocumentListResponse {
    Ok(Json<Vec<DocumentView>>),
}

impl IntoResponse for DocumentListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the delete endpoints.
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

/// `{ "name": ..., "<url_field>": ... }`
fn attachment(body: &Value, url_field: &str) -> Result<NewAttachment, TerminalError> {
    let mut fields = Fields::new(body);
    let name = fields.required("name", |v| Text::new().max_len(255).parse(v));
    let url = fields.required(url_field, |v| Text::new().parse(v));
    let (Some(name), Some(url)) = (name, url) else {
        return Err(fields.into_error());
    };
    Ok(NewAttachment { name, url })
}

/// `POST /api/files/container_visit/{visit_id}/image/create`
pub async fn create_image<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(visit_id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<ImageResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let visit_id: VisitId = parse_id(&visit_id, "ContainerVisit")?;
    let image = attachment(&body, "image")?;
    let image = state.storage_service.attach_image(visit_id, image).await?;
    Ok(ImageResponse::Created(Json(ImageView::from(&image))))
}

/// `DELETE /api/files/container_visit/image/{image_id}/delete`
pub async fn delete_image<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(image_id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let id: AttachmentId = parse_id(&image_id, "Image")?;
    state.storage_service.remove_image(id).await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/files/container_visit/{visit_id}/images/download`
pub async fn download_images<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(visit_id): Path<String>,
) -> Result<ImageListResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let visit_id: VisitId = parse_id(&visit_id, "ContainerVisit")?;
    let images = state.storage_service.list_images(visit_id).await?;
    Ok(ImageListResponse::Ok(Json(
        images.iter().map(ImageView::from).collect(),
    )))
}

/// `POST /api/files/container_visit/{visit_id}/document/create`
pub async fn create_document<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(visit_id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<DocumentResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let visit_id: VisitId = parse_id(&visit_id, "ContainerVisit")?;
    let document = attachment(&body, "document")?;
    let document = state
        .storage_service
        .attach_document(visit_id, document)
        .await?;
    Ok(DocumentResponse::Created(Json(DocumentView::from(&document))))
}

/// `DELETE /api/files/container_visit/document/{document_id}/delete`
pub async fn delete_document<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(document_id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let id: AttachmentId = parse_id(&document_id, "Document")?;
    state.storage_service.remove_document(id).await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/files/container_visit/{visit_id}/documents/download`
pub async fn download_documents<V, C, Co, K>(
    State(state): State<AppState<V, C, Co, K>>,
    Path(visit_id): Path<String>,
) -> Result<DocumentListResponse, ApiError>
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    let visit_id: VisitId = parse_id(&visit_id, "ContainerVisit")?;
    let documents = state.storage_service.list_documents(visit_id).await?;
    Ok(DocumentListResponse::Ok(Json(
        documents.iter().map(DocumentView::from).collect(),
    )))
}
