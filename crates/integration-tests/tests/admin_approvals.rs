//! Integration tests for list pages and the approve/reject flow.

use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, ResponseTemplate};

use tojumi_integration_tests::{TestApp, location, mock_operation, mock_operation_error};

fn student(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "user": { "id": format!("u-{id}"), "firstName": "Tunde", "lastName": "Bello", "email": "tunde@example.com" },
        "isApproved": status,
        "careExperienceLength": 3
    })
}

fn guarantor(index: usize, verified: &str) -> Value {
    json!({
        "id": format!("g{index}"),
        "firstName": format!("Guarantor{index:03}"),
        "lastName": "Eze",
        "verified": verified,
        "createdAt": "2024-03-12T10:00:00Z"
    })
}

// =============================================================================
// Lists
// =============================================================================

#[tokio::test]
async fn test_guarantor_list_third_page() {
    let app = TestApp::spawn().await;
    app.login().await;
    let guarantors: Vec<Value> = (1..=120).map(|i| guarantor(i, "PENDING")).collect();
    mock_operation(&app.api, "GetGuarantors", "getGuarantors", json!(guarantors)).await;

    let response = app.get("/dashboard/guarantors?page=3").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap_or_default();

    assert!(body.contains("Showing 101-120 of 120"));
    assert!(body.contains("Guarantor101"));
    assert!(body.contains("Guarantor120"));
    assert!(!body.contains("Guarantor100"));
    assert!(body.contains(r#"href="?page=2""#));
}

#[tokio::test]
async fn test_status_filter_counts_filtered_subset() {
    let app = TestApp::spawn().await;
    app.login().await;
    let students = json!([
        student("s1", "PENDING"),
        student("s2", "APPROVED"),
        student("s3", "APPROVED"),
        student("s4", "REJECTED"),
    ]);
    mock_operation(&app.api, "GetStudents", "getStudents", students).await;

    let body = app
        .get("/dashboard/students?filter=approved")
        .await
        .text()
        .await
        .unwrap_or_default();

    assert!(body.contains("Showing 2 of 4"));
    assert!(body.contains("/dashboard/students/s2"));
    assert!(!body.contains("/dashboard/students/s1\""));
}

#[tokio::test]
async fn test_list_failure_is_shown_in_page() {
    let app = TestApp::spawn().await;
    app.login().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "GetAllCareHomes" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "care home service unavailable" }]
        })))
        .mount(&app.api)
        .await;

    let response = app.get("/dashboard/carehomes").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap_or_default();
    assert!(body.contains("Care home service unavailable"));
    assert!(!body.contains("No records yet."));
}

#[tokio::test]
async fn test_failed_refetch_shows_error_instead_of_earlier_table() {
    let app = TestApp::spawn().await;
    app.login().await;
    let carehomes = json!([
        { "id": "h1", "name": "Sunrise Haven", "isApproved": "PENDING" },
        { "id": "h2", "name": "Palm Court", "isApproved": "APPROVED" }
    ]);
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "GetAllCareHomes" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "getAllCareHomes": carehomes } })),
        )
        .up_to_n_times(1)
        .mount(&app.api)
        .await;
    mock_operation_error(&app.api, "GetAllCareHomes", "care home service unavailable").await;

    let first = app.get("/dashboard/carehomes").await.text().await.unwrap_or_default();
    assert!(first.contains("Sunrise Haven"));
    assert!(first.contains("data-table"));

    let second = app.get("/dashboard/carehomes").await.text().await.unwrap_or_default();
    assert!(second.contains("Care home service unavailable"));
    assert!(!second.contains("data-table"));
    assert!(!second.contains("Sunrise Haven"));
}

#[tokio::test]
async fn test_unknown_record_is_not_found() {
    let app = TestApp::spawn().await;
    app.login().await;
    mock_operation(&app.api, "GetGuarantor", "getGuarantor", Value::Null).await;

    let response = app.get("/dashboard/guarantors/missing").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(
        response
            .text()
            .await
            .unwrap_or_default()
            .contains("This record could not be found.")
    );
}

// =============================================================================
// Approve / reject
// =============================================================================

#[tokio::test]
async fn test_student_approval_carries_level() {
    let app = TestApp::spawn().await;
    app.login().await;
    mock_operation(&app.api, "GetStudent", "getStudent", student("s1", "PENDING")).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "operationName": "ApproveStudent",
            "variables": { "id": "s1", "level": "SENIOR" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "approveStudent": { "id": "s1", "isApproved": "APPROVED", "level": "SENIOR" } }
        })))
        .expect(1)
        .mount(&app.api)
        .await;

    let page = app
        .get("/dashboard/students/s1?level=SENIOR")
        .await
        .text()
        .await
        .unwrap_or_default();
    assert!(page.contains(r#"name="level" value="SENIOR""#));

    let response = app
        .post_form(
            "/dashboard/students/s1/approve",
            &[("level", "SENIOR"), ("return_to", "/dashboard/students/s1")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard/students/s1");

    let body = app.follow(response).await;
    assert!(body.contains("Student approved successfully!"));
}

#[tokio::test]
async fn test_student_approval_without_level_is_refused() {
    let app = TestApp::spawn().await;
    app.login().await;
    mock_operation(&app.api, "GetStudent", "getStudent", student("s1", "PENDING")).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "ApproveStudent" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.api)
        .await;

    let response = app.post_form("/dashboard/students/s1/approve", &[]).await;

    let body = app.follow(response).await;
    assert!(body.contains("Select a level before approving."));
}

#[tokio::test]
async fn test_guarantor_rejection_and_flag_confirmation() {
    let app = TestApp::spawn().await;
    app.login().await;
    mock_operation(&app.api, "GetGuarantor", "getGuarantor", guarantor(7, "PENDING")).await;
    mock_operation(&app.api, "RejectGuarantor", "rejectGuarantor", json!(true)).await;

    let response = app.post_form("/dashboard/guarantors/g7/reject", &[]).await;
    assert_eq!(location(&response), "/dashboard/guarantors/g7");

    let body = app.follow(response).await;
    assert!(body.contains("Guarantor rejected successfully!"));
}

#[tokio::test]
async fn test_decided_record_cannot_be_decided_again() {
    let app = TestApp::spawn().await;
    app.login().await;
    mock_operation(&app.api, "GetCareBusiness", "getCareBusiness", json!({
        "id": "b1",
        "user": { "id": "u-b1", "firstName": "Grace", "lastName": "Care", "email": "grace@example.com" },
        "isApproved": "APPROVED"
    }))
    .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "RejectCareBusiness" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.api)
        .await;

    let page = app
        .get("/dashboard/providers/b1")
        .await
        .text()
        .await
        .unwrap_or_default();
    assert!(!page.contains("/dashboard/providers/b1/reject"));

    let response = app.post_form("/dashboard/providers/b1/reject", &[]).await;
    let body = app.follow(response).await;
    assert!(body.contains("This care provider has already been approved."));
}

#[tokio::test]
async fn test_failed_decision_reports_server_reason() {
    let app = TestApp::spawn().await;
    app.login().await;
    mock_operation(&app.api, "GetCareHome", "getCareHome", json!({
        "id": "h1",
        "name": "Sunrise Home",
        "isApproved": "PENDING"
    }))
    .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "ApproveCareHome" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "care home is missing documents" }]
        })))
        .mount(&app.api)
        .await;

    let response = app
        .post_form(
            "/dashboard/carehomes/h1/approve",
            &[("return_to", "/dashboard/carehomes?filter=pending")],
        )
        .await;
    assert_eq!(location(&response), "/dashboard/carehomes?filter=pending");

    mock_operation(&app.api, "GetAllCareHomes", "getAllCareHomes", json!([])).await;
    let body = app.follow(response).await;
    assert!(body.contains("Care home is missing documents"));
}
