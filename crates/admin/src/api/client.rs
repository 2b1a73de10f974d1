//! HTTP transport for the Tojumi GraphQL API.

use std::sync::Arc;

use graphql_client::{GraphQLQuery, Response};
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use secrecy::SecretString;
use tracing::instrument;
use url::Url;

use super::{ApiError, ApiSession, GraphQLError};

/// Tojumi GraphQL API client.
///
/// Cheap to clone; every clone shares one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    endpoint: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the given GraphQL endpoint.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                endpoint,
            }),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Execute a declared operation.
    ///
    /// With a session, its bearer token is attached; an expired token fails
    /// before anything is sent. A refreshed token in the response's
    /// `Authorization` header replaces the session's token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the token has expired, the request fails, the
    /// API rejects the token, or the response carries GraphQL errors or no
    /// data.
    #[instrument(skip(self, session, variables), fields(operation = tracing::field::Empty))]
    pub async fn execute<Q: GraphQLQuery>(
        &self,
        session: Option<&ApiSession>,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ApiError> {
        let body = Q::build_query(variables);
        tracing::Span::current().record("operation", body.operation_name);

        let mut request = self.inner.client.post(self.inner.endpoint.clone()).json(&body);
        if let Some(session) = session {
            request = request.header(AUTHORIZATION, session.bearer()?);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            if let Some(session) = session {
                session.mark_rejected();
            }
            return Err(ApiError::NotAuthenticated);
        }

        if let Some(session) = session
            && let Some(token) = refreshed_token(response.headers())
        {
            tracing::debug!("API issued a refreshed token");
            session.replace_token(SecretString::from(token));
        }

        let bytes = response.bytes().await?;
        let parsed: Response<Q::ResponseData> = match serde_json::from_slice(&bytes) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(ApiError::UnexpectedStatus(status.as_u16()));
            }
            Err(e) => return Err(ApiError::Parse(e)),
        };

        if let Some(errors) = parsed.errors
            && !errors.is_empty()
        {
            let errors: Vec<GraphQLError> = errors.into_iter().map(GraphQLError::from).collect();
            tracing::warn!(
                operation = body.operation_name,
                error = %errors.first().map_or("", |e| e.message.as_str()),
                "GraphQL operation returned errors"
            );
            return Err(ApiError::GraphQL(errors));
        }

        parsed.data.ok_or(ApiError::EmptyResponse)
    }
}

/// Token from an `Authorization: Bearer <token>` response header.
fn refreshed_token(headers: &reqwest::header::HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use secrecy::ExposeSecret;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::operations::{GetAllCareServiceTypes, GetCareHome, IdVariables, NoVariables};
    use crate::api::session::tests::jwt_with_exp;

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(Url::parse(&server.uri()).unwrap())
    }

    fn live_session() -> (ApiSession, String) {
        let token = jwt_with_exp(Utc::now().timestamp() + 3600);
        (ApiSession::new(SecretString::from(token.clone())), token)
    }

    #[tokio::test]
    async fn test_execute_sends_bearer_and_decodes_data() {
        let server = MockServer::start().await;
        let (session, token) = live_session();

        Mock::given(method("POST"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .and(body_partial_json(json!({ "operationName": "GetAllCareServiceTypes" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "getAllCareServiceTypes": [{ "id": "t1", "name": "Companionship" }] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let data = client(&server)
            .execute::<GetAllCareServiceTypes>(Some(&session), NoVariables {})
            .await
            .unwrap();
        let types = data.into_inner().unwrap();
        assert_eq!(types[0].name, "Companionship");
    }

    #[tokio::test]
    async fn test_expired_token_never_reaches_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let session = ApiSession::new(SecretString::from(jwt_with_exp(1_000)));
        let err = client(&server)
            .execute::<GetAllCareServiceTypes>(Some(&session), NoVariables {})
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::TokenExpired));
    }

    #[tokio::test]
    async fn test_graphql_errors_are_surfaced() {
        let server = MockServer::start().await;
        let (session, _) = live_session();
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{ "message": "care home service unavailable", "path": ["getAllCareHomes"] }]
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .execute::<GetAllCareServiceTypes>(Some(&session), NoVariables {})
            .await
            .unwrap_err();
        let ApiError::GraphQL(errors) = &err else {
            panic!("expected GraphQL error, got {err:?}");
        };
        assert_eq!(errors[0].path.as_deref(), Some("getAllCareHomes"));
        assert_eq!(err.operator_message("Failed"), "Care home service unavailable");
    }

    #[tokio::test]
    async fn test_unauthorized_status() {
        let server = MockServer::start().await;
        let (session, _) = live_session();
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server)
            .execute::<GetAllCareServiceTypes>(Some(&session), NoVariables {})
            .await
            .unwrap_err();
        assert!(err.requires_login());
        assert!(session.requires_login());
    }

    #[tokio::test]
    async fn test_bad_gateway_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = client(&server)
            .execute::<GetAllCareServiceTypes>(None, NoVariables {})
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedStatus(502)));
    }

    #[tokio::test]
    async fn test_refreshed_token_replaces_session_token() {
        let server = MockServer::start().await;
        let (session, _) = live_session();
        let fresh = jwt_with_exp(Utc::now().timestamp() + 7200);

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("authorization", format!("Bearer {fresh}").as_str())
                    .set_body_json(json!({ "data": { "getCareHome": null } })),
            )
            .mount(&server)
            .await;

        let data = client(&server)
            .execute::<GetCareHome>(
                Some(&session),
                IdVariables {
                    id: "missing".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(data.into_inner().is_none());
        assert_eq!(session.take_refreshed().unwrap().expose_secret(), fresh);
    }
}
