//! Bitbucket API client and request invoker
//!
//! Every API call goes through [`BitbucketClient::invoke`], which resolves
//! the base URL, attaches the session's auth header and, for paginated
//! endpoints, follows `next` links until the server stops sending them.
//! The HTTP layer sits behind [`Transport`] so the invoker can be driven
//! by scripted responses in tests.

use std::future::Future;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::core::config::Config;
use crate::core::session::{AuthType, Session};
use crate::error::{BucketError, Result};

/// HTTP methods used by the Bitbucket API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as `application/json`
    Json(Value),
    /// Sent as `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
}

/// One fully resolved HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Value of the `Authorization` header
    pub authorization: Option<String>,
    pub body: Option<RequestBody>,
}

/// Raw HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends HTTP requests
pub trait Transport {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// [`Transport`] backed by reqwest
///
/// No timeout beyond reqwest's default and no retries.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method.into(), &request.url)
            .header(ACCEPT, "application/json");

        if let Some(authorization) = &request.authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }

        builder = match &request.body {
            Some(RequestBody::Json(body)) => builder.json(body),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}

/// Resolved API roots
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub api: Url,
    pub internal_api: Url,
    pub token: Url,
}

impl Endpoints {
    pub fn new(api: &str, internal_api: &str, token: &str) -> Result<Self> {
        Ok(Self {
            api: Url::parse(&with_trailing_slash(api))?,
            internal_api: Url::parse(&with_trailing_slash(internal_api))?,
            token: Url::parse(token)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_url, &config.internal_api_url, &config.token_url)
    }
}

/// Relative joins drop the last path segment unless the base ends with '/'
fn with_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    }
}

/// A single logical API call
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointRequest {
    pub method: Method,
    /// Path relative to the API root, may include a query string
    pub path: String,
    pub body: Option<Value>,
    /// Follow `next` links and aggregate `values`
    pub paginated: bool,
    /// Target the internal API instead of the public one
    pub internal: bool,
}

impl EndpointRequest {
    fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
            paginated: false,
            internal: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, None)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path, Some(body))
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path, Some(body))
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path, None)
    }

    pub fn paginated(mut self) -> Self {
        self.paginated = true;
        self
    }

    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }
}

/// Bitbucket API client
///
/// Owns the active [`Session`], if any. All resource handlers borrow the
/// client and go through [`invoke`](Self::invoke).
pub struct BitbucketClient<T = HttpTransport> {
    transport: T,
    endpoints: Endpoints,
    session: Option<Session>,
}

impl BitbucketClient<HttpTransport> {
    /// Create a client for the endpoints in the configuration
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_transport(
            HttpTransport::new(),
            Endpoints::from_config(config)?,
        ))
    }
}

impl<T: Transport> BitbucketClient<T> {
    pub fn with_transport(transport: T, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
            session: None,
        }
    }

    /// Attach a previously persisted session
    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The active session
    pub fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(BucketError::NotAuthenticated)
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Replace the active session after a successful login
    pub(crate) fn open_session(&mut self, session: Session) -> &Session {
        self.session.insert(session)
    }

    /// Drop the active session, returning it
    pub fn close_session(&mut self) -> Option<Session> {
        self.session.take()
    }

    /// Record the selected team on the active session
    pub fn select_team(&mut self, team: &str) -> Result<()> {
        let session = self.session.as_mut().ok_or(BucketError::NotAuthenticated)?;
        session.select_team(team);
        debug!(team, "selected team");
        Ok(())
    }

    /// Issue one logical API call
    ///
    /// Paginated requests return a JSON array holding every page's
    /// `values` in page order. There is no page limit: a server that
    /// always returns `next` keeps this looping.
    pub async fn invoke(&self, request: &EndpointRequest) -> Result<Value> {
        let session = self.session()?;

        let base = if request.internal {
            if session.auth_type() != AuthType::Bearer {
                return Err(BucketError::UnsupportedAuth);
            }
            &self.endpoints.internal_api
        } else {
            &self.endpoints.api
        };

        let url = base.join(request.path.trim_start_matches('/'))?;
        let authorization = session.auth_header();

        if !request.paginated {
            return self
                .execute(HttpRequest {
                    method: request.method,
                    url: url.to_string(),
                    authorization: Some(authorization),
                    body: request.body.clone().map(RequestBody::Json),
                })
                .await;
        }

        let mut items = Vec::new();
        let mut next = Some(url.to_string());
        let mut pages = 0usize;

        while let Some(page_url) = next.take() {
            let page = self
                .execute(HttpRequest {
                    method: Method::Get,
                    url: page_url,
                    authorization: Some(authorization.clone()),
                    body: None,
                })
                .await?;

            let (values, next_url) = split_page(page)?;
            items.extend(values);
            pages += 1;
            debug!(pages, items = items.len(), "fetched page");

            next = next_url.filter(|url| !url.is_empty());
        }

        Ok(Value::Array(items))
    }

    /// [`invoke`](Self::invoke) and deserialize the result
    pub async fn invoke_as<D: DeserializeOwned>(&self, request: &EndpointRequest) -> Result<D> {
        let value = self.invoke(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send one request and parse the JSON response
    ///
    /// Non-2xx statuses become [`BucketError::Api`]; an empty body parses
    /// as `null`.
    pub(crate) async fn execute(&self, request: HttpRequest) -> Result<Value> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(BucketError::Api {
                status: response.status,
                payload: response.body,
            });
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&response.body)?)
    }
}

/// Split a page into its `values` and the `next` link
fn split_page(page: Value) -> Result<(Vec<Value>, Option<String>)> {
    let Value::Object(mut map) = page else {
        return Err(BucketError::InvalidResponse(
            "paginated response is not an object".to_string(),
        ));
    };

    let values = match map.remove("values") {
        Some(Value::Array(values)) => values,
        _ => {
            return Err(BucketError::InvalidResponse(
                "paginated response has no 'values' array".to_string(),
            ))
        }
    };

    let next = match map.remove("next") {
        Some(Value::String(next)) => Some(next),
        _ => None,
    };

    Ok((values, next))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::{client_with_session, FakeTransport, API_ROOT, INTERNAL_ROOT};

    #[tokio::test]
    async fn test_invoke_without_session_fails_before_sending() {
        let transport = FakeTransport::new();
        let client = BitbucketClient::with_transport(transport, crate::test_support::endpoints());

        let result = client.invoke(&EndpointRequest::get("user")).await;
        assert!(matches!(result, Err(BucketError::NotAuthenticated)));
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_single_request_returns_body_and_sends_auth() {
        let transport = FakeTransport::new().respond(200, json!({"slug": "website"}));
        let client = client_with_session(transport, AuthType::Basic);

        let value = client
            .invoke(&EndpointRequest::get("repositories/acme/website"))
            .await
            .unwrap();
        assert_eq!(value, json!({"slug": "website"}));

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(
            requests[0].url,
            format!("{}repositories/acme/website", API_ROOT)
        );
        assert!(requests[0]
            .authorization
            .as_deref()
            .unwrap()
            .starts_with("Basic "));
        assert_eq!(requests[0].body, None);
    }

    #[tokio::test]
    async fn test_body_is_sent_as_json() {
        let transport = FakeTransport::new().respond(200, json!({}));
        let client = client_with_session(transport, AuthType::Bearer);

        client
            .invoke(&EndpointRequest::put("repositories/acme/site", json!({"description": "x"})))
            .await
            .unwrap();

        let requests = client.transport().requests();
        assert_eq!(requests[0].method, Method::Put);
        assert_eq!(
            requests[0].body,
            Some(RequestBody::Json(json!({"description": "x"})))
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let transport = FakeTransport::new().respond(404, json!({"error": {"message": "Not found"}}));
        let client = client_with_session(transport, AuthType::Basic);

        match client.invoke(&EndpointRequest::get("repositories/acme/nope")).await {
            Err(BucketError::Api { status, payload }) => {
                assert_eq!(status, 404);
                assert!(payload.contains("Not found"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_body_is_null() {
        let transport = FakeTransport::new().respond_raw(204, "");
        let client = client_with_session(transport, AuthType::Basic);

        let value = client
            .invoke(&EndpointRequest::delete("repositories/acme/old"))
            .await
            .unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_pagination_preserves_page_order() {
        let page2 = "https://api.example.test/2.0/repositories/acme?page=2";
        let page3 = "https://api.example.test/2.0/repositories/acme?page=3";
        let transport = FakeTransport::new()
            .respond(200, json!({"values": [1, 2, 3], "next": page2}))
            .respond(200, json!({"values": [4], "next": page3}))
            .respond(200, json!({"values": [5, 6]}));
        let client = client_with_session(transport, AuthType::Basic);

        let value = client
            .invoke(&EndpointRequest::get("repositories/acme").paginated())
            .await
            .unwrap();
        assert_eq!(value, json!([1, 2, 3, 4, 5, 6]));

        let urls: Vec<String> = client
            .transport()
            .requests()
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(
            urls,
            vec![
                format!("{}repositories/acme", API_ROOT),
                page2.to_string(),
                page3.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_pagination_stops_on_empty_next() {
        let transport = FakeTransport::new().respond(200, json!({"values": [], "next": ""}));
        let client = client_with_session(transport, AuthType::Basic);

        let value = client
            .invoke(&EndpointRequest::get("teams?role=member").paginated())
            .await
            .unwrap();
        assert_eq!(value, json!([]));
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_pagination_failure_discards_earlier_pages() {
        let transport = FakeTransport::new()
            .respond(200, json!({"values": [1], "next": "https://api.example.test/2.0/x?page=2"}))
            .respond(500, json!({"error": "boom"}));
        let client = client_with_session(transport, AuthType::Basic);

        let result = client
            .invoke(&EndpointRequest::get("x").paginated())
            .await;
        assert!(matches!(result, Err(BucketError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_page_without_values_is_invalid() {
        let transport = FakeTransport::new().respond(200, json!({"size": 0}));
        let client = client_with_session(transport, AuthType::Basic);

        let result = client
            .invoke(&EndpointRequest::get("x").paginated())
            .await;
        assert!(matches!(result, Err(BucketError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_internal_api_requires_bearer() {
        let transport = FakeTransport::new();
        let client = client_with_session(transport, AuthType::Basic);

        let result = client
            .invoke(&EndpointRequest::get("repositories/acme/site/settings").internal())
            .await;
        assert!(matches!(result, Err(BucketError::UnsupportedAuth)));
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_internal_api_uses_internal_root_under_bearer() {
        let transport = FakeTransport::new().respond(200, json!({"ok": true}));
        let client = client_with_session(transport, AuthType::Bearer);

        client
            .invoke(&EndpointRequest::get("repositories/acme/site/settings").internal())
            .await
            .unwrap();

        let requests = client.transport().requests();
        assert_eq!(
            requests[0].url,
            format!("{}repositories/acme/site/settings", INTERNAL_ROOT)
        );
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer test-token"));
    }

    #[test]
    fn test_endpoints_add_trailing_slash() {
        let endpoints = Endpoints::new(
            "https://api.bitbucket.org/2.0",
            "https://api.bitbucket.org/internal",
            "https://bitbucket.org/site/oauth2/access_token",
        )
        .unwrap();
        assert_eq!(
            endpoints.api.join("user").unwrap().as_str(),
            "https://api.bitbucket.org/2.0/user"
        );
    }

    #[test]
    fn test_project_filter_query_survives_join() {
        let endpoints = crate::test_support::endpoints();
        let url = endpoints
            .api
            .join("repositories/acme?q=project.key=%22KEY%22")
            .unwrap();
        assert_eq!(
            url.as_str(),
            format!("{}repositories/acme?q=project.key=%22KEY%22", API_ROOT)
        );
    }
}
