//! Shared helpers for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use secrecy::SecretString;
use serde_json::{json, Value};

use crate::bitbucket::client::{BitbucketClient, Endpoints, HttpRequest, HttpResponse, Transport};
use crate::bitbucket::user::User;
use crate::core::session::{AuthMaterial, AuthType, Session};
use crate::error::{BucketError, Result};

pub const API_ROOT: &str = "https://api.example.test/2.0/";
pub const INTERNAL_ROOT: &str = "https://api.example.test/internal/";
pub const TOKEN_URL: &str = "https://auth.example.test/site/oauth2/access_token";

/// Transport that replays scripted responses and records every request
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response
    pub fn respond(self, status: u16, body: Value) -> Self {
        self.respond_raw(status, &body.to_string())
    }

    /// Queue a response with a raw body
    pub fn respond_raw(self, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().push_back(HttpResponse {
            status,
            body: body.to_string(),
        });
        self
    }

    /// Requests sent so far, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BucketError::InvalidResponse("no scripted response left".to_string()))
    }
}

pub fn endpoints() -> Endpoints {
    Endpoints::new(API_ROOT, INTERNAL_ROOT, TOKEN_URL).unwrap()
}

pub fn user_json() -> Value {
    json!({
        "display_name": "Jane Doe",
        "nickname": "jdoe",
        "account_id": "557058:0000",
        "uuid": "{d2a5c3e0-0000-0000-0000-000000000000}",
        "type": "user"
    })
}

pub fn user() -> User {
    serde_json::from_value(user_json()).unwrap()
}

/// Client with a logged-in session and team `acme` selected
pub fn client_with_session(
    transport: FakeTransport,
    auth_type: AuthType,
) -> BitbucketClient<FakeTransport> {
    let auth = match auth_type {
        AuthType::Basic => AuthMaterial::basic("jdoe", &SecretString::from("app-password")),
        AuthType::Bearer => AuthMaterial::bearer(SecretString::from("test-token")),
    };
    let mut session = Session::new(auth, &user());
    session.select_team("acme");

    BitbucketClient::with_transport(transport, endpoints()).with_session(Some(session))
}
