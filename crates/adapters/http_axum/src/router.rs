//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use terminal_app::ports::{
    CatalogRepository, CompanyRepository, ContainerRepository, ContainerVisitRepository,
};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Serves the API under `/api` next to a `/health` probe.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<V, C, Co, K>(state: AppState<V, C, Co, K>) -> Router
where
    V: ContainerVisitRepository + Send + Sync + 'static,
    C: ContainerRepository + Send + Sync + 'static,
    Co: CompanyRepository + Send + Sync + 'static,
    K: CatalogRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::stub_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn send(request: Request<Body>) -> Response {
        build(stub_state()).oneshot(request).await.unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn register_body() -> Value {
        json!({
            "container_name": "MSCU1234567",
            "container_size": "20",
            "container_state": "empty",
            "container_owner": "MSC",
            "product_name": null,
            "transport_type": "auto",
            "transport_number": "AB1234",
            "company_id": 7,
            "entry_time": "2024-05-01T10:00:00Z",
            "services": []
        })
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let response = send(get_request("/health")).await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_return_not_found_for_missing_visit() {
        let response = send(get_request("/api/container_visit_list/5")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Not found");
    }

    #[tokio::test]
    async fn should_return_not_found_for_non_numeric_visit_id() {
        let response = send(get_request("/api/container_visit/abc/available_services")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_report_missing_register_fields() {
        let response = send(json_request(
            "POST",
            "/api/container_visit_register",
            r#"{"container_size": "30"}"#,
        ))
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let fields = &body["extra"]["fields"];
        assert_eq!(fields["container_name"], json!(["This field is required."]));
        assert_eq!(
            fields["container_size"],
            json!(["\"30\" is not a valid choice."])
        );
        assert_eq!(fields["company_id"], json!(["This field is required."]));
    }

    #[tokio::test]
    async fn should_report_unknown_customer_on_register() {
        let response = send(json_request(
            "POST",
            "/api/container_visit_register",
            &register_body().to_string(),
        ))
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(
            body["extra"]["fields"]["company_id"],
            json!(["Customer does not exist"])
        );
    }

    #[tokio::test]
    async fn should_reject_malformed_json() {
        let response = send(json_request(
            "POST",
            "/api/container_visit_register",
            "{not json",
        ))
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Malformed request body");
    }

    #[tokio::test]
    async fn should_report_batch_errors_per_row() {
        let rows = json!([
            {
                "container_name": "MSCU1234567",
                "container_size": "20",
                "company_name": "Baltic Shipping",
                "container_state": "empty",
                "container_owner": "MSC",
                "transport_type": "auto",
                "transport_number": "AB1234",
                "entry_time": "2024-05-01T10:00:00Z"
            },
            {
                "container_name": "TGHU7654321",
                "container_size": "40",
                "company_name": "Baltic Shipping",
                "container_state": "loaded",
                "container_owner": "MSC",
                "transport_type": "wagon",
                "transport_number": "52345678",
                "entry_time": "yesterday"
            }
        ]);

        let response = send(json_request(
            "POST",
            "/api/container_visit_register/batch",
            &rows.to_string(),
        ))
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let fields = body["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], json!({}));
        assert!(fields[1]["1"]["entry_time"].is_array());
        assert_eq!(body["extra"]["fields"], body["fields"]);
    }

    #[tokio::test]
    async fn should_reject_batch_body_that_is_not_a_list() {
        let response = send(json_request(
            "POST",
            "/api/container_visit_register/batch",
            r#"{"container_name": "MSCU1234567"}"#,
        ))
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(
            body["extra"]["fields"]["non_field_errors"],
            json!(["Expected a list of items."])
        );
    }

    #[tokio::test]
    async fn should_return_empty_page_envelope() {
        let response = send(get_request("/api/containers_visit_list")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({
                "limit": 10,
                "offset": 0,
                "count": 0,
                "next": null,
                "previous": null,
                "results": []
            })
        );
    }

    #[tokio::test]
    async fn should_list_past_the_end_at_largest_offset() {
        let response = send(get_request(
            "/api/containers_visit_list?offset=18446744073709551615",
        ))
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["offset"], json!(u64::MAX));
        assert_eq!(body["next"], Value::Null);
        assert_eq!(body["results"], json!([]));
    }

    #[tokio::test]
    async fn should_reject_invalid_list_filter() {
        let response = send(get_request("/api/containers_visit_list?container_size=30")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_company_listing() {
        let response = send(get_request("/api/container_visit_list/by_company/3")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_serve_csv_template() {
        let response = send(get_request("/api/container_visit_register/batch")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("container_name,"));
    }

    #[tokio::test]
    async fn should_return_statistics() {
        let response = send(get_request("/api/container_visit_statistics")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total_visits"], 0);
    }

    #[tokio::test]
    async fn should_return_not_found_when_downloading_files_of_missing_visit() {
        for uri in [
            "/api/files/container_visit/4/images/download",
            "/api/files/container_visit/4/documents/download",
        ] {
            let response = send(get_request(uri)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn should_return_not_found_when_deleting_missing_image() {
        let response = send(
            Request::builder()
                .method("DELETE")
                .uri("/api/files/container_visit/image/9/delete")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
