//! Integration tests for Tojumi Admin.
//!
//! Each test spawns the full admin application on a loopback port, backed by
//! a `wiremock` server standing in for the Tojumi GraphQL API, and drives it
//! with a cookie-keeping `reqwest` client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tojumi-integration-tests
//! ```

use std::net::SocketAddr;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::{Client, Response, StatusCode, header::LOCATION, redirect};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tojumi_admin::AppState;
use tojumi_admin::config::AdminConfig;

/// Unsigned JWT whose `exp` claim is `exp` (seconds since the epoch).
#[must_use]
pub fn jwt_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"admin-1","exp":{exp}}}"#));
    format!("{header}.{payload}.signature")
}

/// Token valid for the next hour.
#[must_use]
pub fn live_token() -> String {
    jwt_with_exp(chrono::Utc::now().timestamp() + 3600)
}

/// Token that expired an hour ago.
#[must_use]
pub fn expired_token() -> String {
    jwt_with_exp(chrono::Utc::now().timestamp() - 3600)
}

/// The operator record returned by the `login` mutation.
#[must_use]
pub fn admin_user() -> Value {
    json!({
        "id": "admin-1",
        "firstName": "Ada",
        "lastName": "Okafor",
        "email": "ada@tojumi.com",
        "accountType": "ADMIN",
        "isApproved": true
    })
}

/// Answer `operation` with `{"data": {<root>: data}}`.
pub async fn mock_operation(api: &MockServer, operation: &str, root: &str, data: Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": operation })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { root: data } })))
        .mount(api)
        .await;
}

/// Answer `operation` with a GraphQL error.
pub async fn mock_operation_error(api: &MockServer, operation: &str, message: &str) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": operation })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": message }]
        })))
        .mount(api)
        .await;
}

/// A running admin application and the fake API behind it.
pub struct TestApp {
    pub address: SocketAddr,
    pub api: MockServer,
    pub client: Client,
}

impl TestApp {
    /// Start the admin app against a fresh mock API.
    ///
    /// # Panics
    ///
    /// Panics if the app cannot be configured or bound.
    pub async fn spawn() -> Self {
        Self::spawn_with(&[]).await
    }

    /// Start the admin app with extra configuration variables.
    ///
    /// # Panics
    ///
    /// Panics if the app cannot be configured or bound.
    pub async fn spawn_with(extra: &[(&str, &str)]) -> Self {
        let api = MockServer::start().await;
        let endpoint = format!("{}/graphql", api.uri());
        let extra: Vec<(String, String)> = extra
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();

        let config = AdminConfig::from_vars(|key| match key {
            "GRAPHQL_ENDPOINT" => Some(endpoint.clone()),
            "ADMIN_BASE_URL" => Some("http://127.0.0.1".to_string()),
            _ => extra.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()),
        })
        .expect("test configuration is valid");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let address = listener.local_addr().expect("listener has an address");
        let app = tojumi_admin::app(AppState::new(config));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server failed");
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("failed to build HTTP client");

        Self {
            address,
            api,
            client,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.address)
    }

    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Follow one redirect and return the body of the target page.
    ///
    /// # Panics
    ///
    /// Panics if `response` is not a redirect.
    pub async fn follow(&self, response: Response) -> String {
        let target = location(&response);
        self.get(&target)
            .await
            .text()
            .await
            .expect("response body is text")
    }

    /// Log in with `token` as the API-issued bearer token.
    ///
    /// # Panics
    ///
    /// Panics if the login does not redirect.
    pub async fn login_with_token(&self, token: &str) {
        mock_operation(
            &self.api,
            "Login",
            "login",
            json!({ "token": token, "user": admin_user() }),
        )
        .await;
        let response = self
            .post_form("/", &[("email", "ada@tojumi.com"), ("password", "correct horse")])
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    /// Log in with a token valid for the next hour.
    pub async fn login(&self) {
        self.login_with_token(&live_token()).await;
    }
}

/// The `Location` header of a redirect.
///
/// # Panics
///
/// Panics if the header is missing.
#[must_use]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("redirect has a Location header")
        .to_string()
}
