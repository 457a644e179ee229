//! End-to-end smoke tests for the full terminald stack.
//!
//! Each test spins up the complete application (in-memory `SQLite`, real repos,
//! real services, real axum router) and exercises the HTTP layer via
//! `tower::ServiceExt::oneshot`, without binding a TCP port.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use terminal_adapter_http_axum::router;
use terminal_adapter_http_axum::state::AppState;
use terminal_adapter_storage_sqlite_sqlx::{
    Config, SqliteCatalogRepository, SqliteCompanyRepository, SqliteContainerRepository,
    SqliteContainerVisitRepository,
};
use terminal_app::services::catalog_service::CatalogService;
use terminal_app::services::company_service::CompanyService;
use terminal_app::services::container_storage_service::ContainerStorageService;
use tower::ServiceExt;

/// Build a fully-wired router backed by an in-memory `SQLite` database.
async fn app() -> axum::Router {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");

    let pool = db.pool().clone();

    let state = AppState::new(
        ContainerStorageService::new(
            SqliteContainerVisitRepository::new(pool.clone()),
            SqliteContainerRepository::new(pool.clone()),
            SqliteCompanyRepository::new(pool.clone()),
            SqliteCatalogRepository::new(pool.clone()),
        ),
        CompanyService::new(SqliteCompanyRepository::new(pool.clone())),
        CatalogService::new(
            SqliteCatalogRepository::new(pool.clone()),
            SqliteCompanyRepository::new(pool),
        ),
    );

    router::build(state)
}

/// Send one request and decode the JSON body (`null` when empty).
async fn call(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create_company(app: &axum::Router, name: &str) -> i64 {
    let (status, body) = call(app, "POST", "/api/companies", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

fn registration(container: &str, company_id: i64) -> Value {
    json!({
        "container_name": container,
        "container_size": "20",
        "container_state": "empty",
        "container_owner": "MSC",
        "product_name": null,
        "transport_type": "auto",
        "transport_number": "AB1234",
        "company_id": company_id,
        "entry_time": "2024-05-01T10:00:00Z",
        "services": []
    })
}

fn dispatch_body(exit_time: &str) -> Value {
    json!({
        "exit_time": exit_time,
        "exit_transport_type": "wagon",
        "exit_transport_number": "52345678"
    })
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let resp = app()
        .await
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Registration and dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_register_list_and_show_visit() {
    let app = app().await;
    let company_id = create_company(&app, "Baltic Shipping").await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/container_visit_register",
        Some(registration("MSCU1234567", company_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["container"]["name"], "MSCU1234567");
    assert_eq!(body["container"]["size"], "20");
    assert_eq!(body["company"]["name"], "Baltic Shipping");
    assert_eq!(body["entry_time"], "2024-05-01T10:00:00Z");
    let visit_id = body["id"].as_i64().unwrap();

    let (status, body) = call(&app, "GET", "/api/containers_visit_list", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["container"]["size"], "20ft");
    assert!(body["results"][0]["exit_time"].is_null());

    let (status, body) = call(
        &app,
        "GET",
        &format!("/api/container_visit_list/{visit_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["container"]["size"], "20");
    assert_eq!(body["container_owner"], "MSC");
    assert_eq!(body["transport_type"], "auto");
}

#[tokio::test]
async fn should_reject_container_already_in_storage() {
    let app = app().await;
    let company_id = create_company(&app, "Baltic Shipping").await;
    let body = registration("MSCU1234567", company_id);

    let (status, _) = call(&app, "POST", "/api/container_visit_register", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, "POST", "/api/container_visit_register", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["extra"]["fields"]["container_name"],
        json!(["Container is already in storage"])
    );
}

#[tokio::test]
async fn should_reject_unknown_company() {
    let app = app().await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/container_visit_register",
        Some(registration("MSCU1234567", 404)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["extra"]["fields"]["company_id"],
        json!(["Customer does not exist"])
    );
}

#[tokio::test]
async fn should_release_container_on_dispatch() {
    let app = app().await;
    let company_id = create_company(&app, "Baltic Shipping").await;
    let (_, body) = call(
        &app,
        "POST",
        "/api/container_visit_register",
        Some(registration("MSCU1234567", company_id)),
    )
    .await;
    let visit_id = body["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/api/container_visit/{visit_id}/dispatch"),
        Some(dispatch_body("2024-05-04T09:00:00Z")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exit_time"], "2024-05-04T09:00:00Z");
    assert_eq!(body["exit_transport_type"], "wagon");
    assert_eq!(body["storage_days"], 4);

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/api/container_visit/{visit_id}/dispatch"),
        Some(dispatch_body("2024-05-05T09:00:00Z")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["extra"]["fields"].is_object());

    let (status, _) = call(
        &app,
        "POST",
        "/api/container_visit_register",
        Some(registration("MSCU1234567", company_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn should_update_and_delete_visit() {
    let app = app().await;
    let company_id = create_company(&app, "Baltic Shipping").await;
    let (_, body) = call(
        &app,
        "POST",
        "/api/container_visit_register",
        Some(registration("MSCU1234567", company_id)),
    )
    .await;
    let visit_id = body["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/api/container_visit/{visit_id}/update"),
        Some(json!({
            "container_name": "MSCU1234567",
            "container_size": "40",
            "company_id": company_id,
            "container_state": "loaded",
            "notes": "inspected"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["container"]["size"], "40");
    assert_eq!(body["container_state"], "loaded");
    assert_eq!(body["notes"], "inspected");

    let uri = format!("/api/container_visit/{visit_id}/delete");
    let (status, _) = call(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Register MSCU1234567, dispatch it and register it again; returns the id of
/// the earlier, dispatched visit.
async fn reused_container(app: &axum::Router, company_id: i64) -> i64 {
    let (_, body) = call(
        app,
        "POST",
        "/api/container_visit_register",
        Some(registration("MSCU1234567", company_id)),
    )
    .await;
    let earlier_id = body["id"].as_i64().unwrap();
    let (status, _) = call(
        app,
        "PUT",
        &format!("/api/container_visit/{earlier_id}/dispatch"),
        Some(dispatch_body("2024-05-04T09:00:00Z")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(
        app,
        "POST",
        "/api/container_visit_register",
        Some(registration("MSCU1234567", company_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    earlier_id
}

async fn visits_in_terminal(app: &axum::Router, container: &str) -> i64 {
    let (status, body) = call(
        app,
        "GET",
        &format!("/api/containers_visit_list?status=in_terminal&container_name={container}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["count"].as_i64().unwrap()
}

#[tokio::test]
async fn should_keep_container_in_storage_when_earlier_visit_is_edited() {
    let app = app().await;
    let company_id = create_company(&app, "Baltic Shipping").await;
    let earlier_id = reused_container(&app, company_id).await;

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/container_visit/{earlier_id}/update"),
        Some(json!({
            "container_name": "MSCU1234567",
            "container_size": "20",
            "company_id": company_id,
            "notes": "fixed typo"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        "POST",
        "/api/container_visit_register",
        Some(registration("MSCU1234567", company_id)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["extra"]["fields"]["container_name"],
        json!(["Container is already in storage"])
    );
    assert_eq!(visits_in_terminal(&app, "MSCU1234567").await, 1);
}

#[tokio::test]
async fn should_keep_container_in_storage_when_earlier_visit_is_renamed() {
    let app = app().await;
    let company_id = create_company(&app, "Baltic Shipping").await;
    let earlier_id = reused_container(&app, company_id).await;

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/api/container_visit/{earlier_id}/update"),
        Some(json!({
            "container_name": "TGHU7654321",
            "container_size": "20",
            "company_id": company_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["container"]["name"], "TGHU7654321");

    let (status, _) = call(
        &app,
        "POST",
        "/api/container_visit_register",
        Some(registration("MSCU1234567", company_id)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(visits_in_terminal(&app, "MSCU1234567").await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_admit_one_of_many_concurrent_registrations() {
    let app = app().await;
    let company_id = create_company(&app, "Baltic Shipping").await;

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                call(
                    &app,
                    "POST",
                    "/api/container_visit_register",
                    Some(registration("MSCU1234567", company_id)),
                )
                .await
                .0
            })
        })
        .collect();
    let mut created = 0;
    for attempt in attempts {
        if attempt.await.unwrap() == StatusCode::CREATED {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    assert_eq!(visits_in_terminal(&app, "MSCU1234567").await, 1);
}

// ---------------------------------------------------------------------------
// Batch import
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_store_nothing_when_a_batch_row_fails() {
    let app = app().await;
    create_company(&app, "Baltic Shipping").await;

    let rows = json!([
        {
            "container_name": "MSCU1234567",
            "container_size": "20",
            "company_name": "Baltic Shipping",
            "container_state": "Порожний",
            "container_owner": "MSC",
            "transport_type": "Авто",
            "transport_number": "AB1234",
            "entry_time": "2024-05-01T10:00:00Z"
        },
        {
            "container_name": "TGHU7654321",
            "container_size": "40",
            "company_name": "Baltic Shipping",
            "container_state": "half full",
            "container_owner": "MSC",
            "transport_type": "truck",
            "transport_number": "AB1234",
            "entry_time": "2024-05-01T10:00:00Z"
        }
    ]);
    let (status, body) = call(&app, "POST", "/api/container_visit_register/batch", Some(rows)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0], json!({}));
    assert_eq!(
        body["fields"][1]["1"]["container_state"],
        json!(["Invalid container state"])
    );
    assert_eq!(
        body["fields"][1]["1"]["transport_type"],
        json!(["Invalid transport type"])
    );

    let (_, body) = call(&app, "GET", "/api/containers_visit_list", None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn should_import_csv_batch() {
    let app = app().await;
    create_company(&app, "Baltic Shipping").await;

    let csv = "container_name,container_size,company_name,container_state,container_owner,product_name,transport_type,transport_number,entry_time,exit_time,dispatch_method\n\
               MSCU1234567,20,Baltic Shipping,груженый,MSC,timber,Вагон,52345678,2024-05-01T10:00:00Z,,\n\
               TGHU7654321,40HC,Baltic Shipping,порожний,MSC,,Авто,AB1234,2024-04-01T10:00:00Z,2024-04-03T10:00:00Z,Авто\n";
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/container_visit_register/batch")
                .header("content-type", "text/csv")
                .body(Body::from(csv))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let (_, body) = call(&app, "GET", "/api/containers_visit_list", None).await;
    assert_eq!(body["count"], 2);

    let (_, body) = call(
        &app,
        "GET",
        "/api/containers_visit_list?status=in_terminal",
        None,
    )
    .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["container"]["name"], "MSCU1234567");
    assert_eq!(body["results"][0]["container_state"], "loaded");
    assert_eq!(body["results"][0]["transport_type"], "wagon");
}

#[tokio::test]
async fn should_serve_batch_template() {
    let resp = app()
        .await
        .oneshot(
            Request::builder()
                .uri("/api/container_visit_register/batch")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(
        resp.into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec(),
    )
    .unwrap();
    assert!(body.starts_with("container_name,container_size,company_name"));
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_filter_and_paginate_visits() {
    let app = app().await;
    let company_id = create_company(&app, "Baltic Shipping").await;
    for index in 0..12 {
        let mut body = registration(&format!("MSCU{index:07}"), company_id);
        if index % 3 == 0 {
            body["container_size"] = json!("40");
        }
        let (status, _) = call(&app, "POST", "/api/container_visit_register", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = call(&app, "GET", "/api/containers_visit_list", None).await;
    assert_eq!(body["count"], 12);
    assert_eq!(body["results"].as_array().unwrap().len(), 10);
    assert!(body["next"].as_str().unwrap().contains("offset=10"));
    assert!(body["previous"].is_null());

    let (_, body) = call(&app, "GET", "/api/containers_visit_list?limit=5&offset=10", None).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert!(body["next"].is_null());
    assert!(body["previous"].as_str().unwrap().contains("offset=5"));

    let (_, body) = call(&app, "GET", "/api/containers_visit_list?container_size=40", None).await;
    assert_eq!(body["count"], 4);

    let (_, body) = call(
        &app,
        "GET",
        "/api/containers_visit_list?container_name=0000011",
        None,
    )
    .await;
    assert_eq!(body["count"], 1);

    let (_, body) = call(
        &app,
        "GET",
        "/api/containers_visit_list?company_name=baltic",
        None,
    )
    .await;
    assert_eq!(body["count"], 12);

    let (_, body) = call(
        &app,
        "GET",
        "/api/containers_visit_list?status=left_terminal",
        None,
    )
    .await;
    assert_eq!(body["count"], 0);

    let (status, body) = call(&app, "GET", "/api/containers_visit_list?is_empty=maybe", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["extra"]["fields"]["is_empty"].is_array());
}

#[tokio::test]
async fn should_bill_customer_visits_with_free_days() {
    let app = app().await;
    let company_id = create_company(&app, "Baltic Shipping").await;

    let (status, service_type) = call(
        &app,
        "POST",
        "/api/service_types",
        Some(json!({ "name": "Storage", "unit_of_measure": "day" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, service) = call(
        &app,
        "POST",
        "/api/services",
        Some(json!({
            "name": "Storage 20ft",
            "service_type_id": service_type["id"],
            "container_size": "20",
            "base_price": "12.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, contract) = call(
        &app,
        "POST",
        "/api/contracts",
        Some(json!({ "company_id": company_id, "name": "2024", "free_days": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let contract_id = contract["id"].as_i64().unwrap();

    let (status, price) = call(
        &app,
        "POST",
        &format!("/api/contracts/{contract_id}/services"),
        Some(json!({ "service_id": service["id"], "price": "10" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, visit) = call(
        &app,
        "POST",
        "/api/container_visit_register",
        Some(registration("MSCU1234567", company_id)),
    )
    .await;
    let visit_id = visit["id"].as_i64().unwrap();

    let (status, offered) = call(
        &app,
        "GET",
        &format!("/api/container_visit/{visit_id}/available_services"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(offered[0]["id"], price["id"]);
    assert_eq!(offered[0]["price"], "10.00");

    let mut register = registration("TGHU7654321", company_id);
    register["services"] = json!([{ "id": price["id"] }]);
    let (status, _) = call(&app, "POST", "/api/container_visit_register", Some(register)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/container_visit/{visit_id}/dispatch"),
        Some(dispatch_body("2024-05-10T08:00:00Z")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        "GET",
        &format!("/api/container_visit_list/by_company/{company_id}?status=in_terminal"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    let item = &body["results"][0];
    assert_eq!(item["container"]["name"], "TGHU7654321");
    assert_eq!(item["container"]["type"], "20ft");
    assert_eq!(item["is_empty"], true);
    assert_eq!(item["active_services"][0]["name"], "Storage 20ft");
    assert_eq!(item["active_services"][0]["service_type"], "Storage");
    assert_eq!(item["active_services"][0]["price"], "10.00");

    let (_, body) = call(
        &app,
        "GET",
        &format!("/api/container_visit_list/by_company/{company_id}?status=left_terminal"),
        None,
    )
    .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["total_storage_cost"], "0.00");
}

#[tokio::test]
async fn should_return_not_found_for_unknown_company_listing() {
    let app = app().await;

    let (status, _) = call(&app, "GET", "/api/container_visit_list/by_company/77", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Attachments and statistics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_attach_and_remove_files() {
    let app = app().await;
    let company_id = create_company(&app, "Baltic Shipping").await;
    let (_, visit) = call(
        &app,
        "POST",
        "/api/container_visit_register",
        Some(registration("MSCU1234567", company_id)),
    )
    .await;
    let visit_id = visit["id"].as_i64().unwrap();

    let (status, image) = call(
        &app,
        "POST",
        &format!("/api/files/container_visit/{visit_id}/image/create"),
        Some(json!({ "name": "front", "image": "https://files.example/front.jpg" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(image["image"], "https://files.example/front.jpg");

    let (status, document) = call(
        &app,
        "POST",
        &format!("/api/files/container_visit/{visit_id}/document/create"),
        Some(json!({ "name": "bill of lading", "document": "https://files.example/bol.pdf" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, detail) = call(&app, "GET", &format!("/api/container_visit_list/{visit_id}"), None).await;
    assert_eq!(detail["images"][0]["name"], "front");
    assert_eq!(detail["documents"][0]["document"], "https://files.example/bol.pdf");

    let (status, images) = call(
        &app,
        "GET",
        &format!("/api/files/container_visit/{visit_id}/images/download"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        images,
        json!([{ "id": image["id"], "image": "https://files.example/front.jpg", "name": "front" }])
    );
    let (status, documents) = call(
        &app,
        "GET",
        &format!("/api/files/container_visit/{visit_id}/documents/download"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(documents[0]["name"], "bill of lading");

    let image_uri = format!("/api/files/container_visit/image/{}/delete", image["id"]);
    let (status, _) = call(&app, "DELETE", &image_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, "DELETE", &image_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/files/container_visit/document/{}/delete", document["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(
        &app,
        "POST",
        "/api/files/container_visit/999/image/create",
        Some(json!({ "name": "front", "image": "https://files.example/front.jpg" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_report_statistics() {
    let app = app().await;
    let company_id = create_company(&app, "Baltic Shipping").await;
    let mut loaded = registration("TGHU7654321", company_id);
    loaded["container_state"] = json!("loaded");
    for body in [registration("MSCU1234567", company_id), loaded] {
        let (status, _) = call(&app, "POST", "/api/container_visit_register", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = call(&app, "GET", "/api/container_visit_statistics", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_visits"], 2);
    assert_eq!(body["in_terminal"], 2);
    assert_eq!(body["empty_in_terminal"], 1);
    assert_eq!(body["loaded_in_terminal"], 1);
}

#[tokio::test]
async fn should_reject_duplicate_company_name() {
    let app = app().await;
    create_company(&app, "Baltic Shipping").await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/companies",
        Some(json!({ "name": "Baltic Shipping" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["extra"]["fields"]["name"],
        json!(["Company with this name already exists"])
    );
}
