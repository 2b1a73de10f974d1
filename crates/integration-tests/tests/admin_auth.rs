//! Integration tests for admin login, logout and the session guard.

use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, ResponseTemplate};

use tojumi_integration_tests::{
    TestApp, admin_user, expired_token, live_token, location, mock_operation,
    mock_operation_error,
};

// =============================================================================
// Session Guard
// =============================================================================

#[tokio::test]
async fn test_dashboard_redirects_to_login_with_return_path() {
    let app = TestApp::spawn().await;

    let response = app.get("/dashboard/students?filter=pending").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/?redirect=%2Fdashboard%2Fstudents%3Ffilter%3Dpending"
    );
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap_or_default(), "ok");
}

#[tokio::test]
async fn test_login_page_keeps_redirect() {
    let app = TestApp::spawn().await;

    let body = app
        .get("/?redirect=%2Fdashboard%2Fguarantors")
        .await
        .text()
        .await
        .unwrap_or_default();

    assert!(body.contains(r#"name="redirect" value="/dashboard/guarantors""#));
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_lands_on_dashboard_with_notice() {
    let app = TestApp::spawn().await;
    mock_operation(
        &app.api,
        "GetDatabaseOverview",
        "databaseOverview",
        json!({ "totalUsers": 42, "totalStudents": 7, "totalRevenue": "1500000" }),
    )
    .await;

    app.login().await;
    let body = app.get("/dashboard").await.text().await.unwrap_or_default();

    assert!(body.contains("Login successful"));
    assert!(body.contains("₦1,500,000.00"));
    assert!(body.contains("42"));
    assert!(body.contains("Ada Okafor"));
}

#[tokio::test]
async fn test_login_honours_dashboard_redirect_only() {
    let app = TestApp::spawn().await;
    mock_operation(
        &app.api,
        "Login",
        "login",
        json!({ "token": live_token(), "user": admin_user() }),
    )
    .await;

    let response = app
        .post_form(
            "/",
            &[
                ("email", "ada@tojumi.com"),
                ("password", "secret"),
                ("redirect", "https://evil.example/dashboard"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/dashboard");

    app.post_form("/logout", &[]).await;
    let response = app
        .post_form(
            "/",
            &[
                ("email", "ada@tojumi.com"),
                ("password", "secret"),
                ("redirect", "/dashboard/users?filter=verified"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/dashboard/users?filter=verified");
}

#[tokio::test]
async fn test_wrong_password_rerenders_form() {
    let app = TestApp::spawn().await;
    mock_operation_error(&app.api, "Login", "invalid password").await;

    let response = app
        .post_form("/", &[("email", "ada@tojumi.com"), ("password", "wrong")])
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap_or_default();
    assert!(body.contains("Incorrect email or password"));
    assert!(body.contains(r#"value="ada@tojumi.com""#));
}

#[tokio::test]
async fn test_invalid_email_never_reaches_api() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "Login" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.api)
        .await;

    let response = app
        .post_form("/", &[("email", "not-an-email"), ("password", "secret")])
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .text()
            .await
            .unwrap_or_default()
            .contains("Enter a valid email address.")
    );
}

// =============================================================================
// Logout and forced logout
// =============================================================================

#[tokio::test]
async fn test_logout_clears_session() {
    let app = TestApp::spawn().await;
    app.login().await;

    let response = app.post_form("/logout", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = app.get("/dashboard").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/?redirect="));
}

#[tokio::test]
async fn test_expired_token_forces_logout() {
    let app = TestApp::spawn().await;
    app.login_with_token(&expired_token()).await;

    let response = app.get("/dashboard/guarantors").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?redirect=%2Fdashboard%2Fguarantors");

    let body = app.follow(response).await;
    assert!(body.contains("Your session has expired. Please sign in again."));
    assert!(body.contains("Sign in"));
}

#[tokio::test]
async fn test_rejected_token_forces_logout() {
    let app = TestApp::spawn().await;
    app.login().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "GetStudents" })))
        .respond_with(ResponseTemplate::new(401))
        .mount(&app.api)
        .await;

    let response = app.get("/dashboard/students").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app.get("/dashboard").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/?redirect="));
}
