//! Login flows for Bitbucket
//!
//! Two ways in:
//! - Basic: username plus app password, verified by fetching the current user.
//! - OAuth2: an OAuth consumer exchanges the Atlassian account's email and
//!   password for an access token (resource owner password grant), then the
//!   current user is fetched with that token.
//!
//! See: https://developer.atlassian.com/cloud/bitbucket/oauth-2/

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::info;

use crate::bitbucket::client::{BitbucketClient, HttpRequest, Method, RequestBody, Transport};
use crate::core::session::{AuthMaterial, Session};
use crate::error::{BucketError, Result};

/// Username and app password
#[derive(Debug, Clone)]
pub struct BasicCredential {
    pub username: String,
    pub password: SecretString,
}

/// Atlassian account email and password
#[derive(Debug, Clone)]
pub struct AtlassianCredential {
    pub email: String,
    pub password: SecretString,
}

/// OAuth consumer registered in the Bitbucket workspace settings
#[derive(Debug, Clone)]
pub struct OAuthConsumer {
    pub key: String,
    pub secret: SecretString,
}

/// Token response from the OAuth2 endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// The access token for API requests
    pub access_token: String,
    /// Token type (usually "bearer")
    #[serde(default)]
    pub token_type: Option<String>,
    /// Seconds until the access token expires
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Granted scopes, space separated
    #[serde(default)]
    pub scopes: Option<String>,
}

/// Error response from the OAuth2 endpoint
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Turn a token endpoint error body into a readable message
fn describe_token_error(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error,
            error_description: Some(description),
        }) => format!("{}: {}", error, description),
        Ok(ErrorResponse { error, .. }) => error,
        Err(_) => body.to_string(),
    }
}

impl<T: Transport> BitbucketClient<T> {
    /// Log in with basic credentials
    ///
    /// On failure the previous session, if any, is left untouched.
    pub async fn open_basic(&mut self, credential: &BasicCredential) -> Result<&Session> {
        let auth = AuthMaterial::basic(&credential.username, &credential.password);
        let user = self.fetch_user_with(&auth).await?;

        info!(user = %user.nickname, "logged in with basic auth");
        Ok(self.open_session(Session::new(auth, &user)))
    }

    /// Log in through an OAuth consumer
    pub async fn open_oauth(
        &mut self,
        credential: &AtlassianCredential,
        consumer: &OAuthConsumer,
    ) -> Result<&Session> {
        let token = self.exchange_token(credential, consumer).await?;
        let auth = AuthMaterial::bearer(token);
        let user = self.fetch_user_with(&auth).await?;

        info!(user = %user.nickname, "logged in with oauth2");
        Ok(self.open_session(Session::new(auth, &user)))
    }

    /// Exchange account credentials for an access token
    ///
    /// The consumer authenticates with basic auth; the account credentials
    /// travel in the form body.
    pub async fn exchange_token(
        &self,
        credential: &AtlassianCredential,
        consumer: &OAuthConsumer,
    ) -> Result<SecretString> {
        let consumer_auth = AuthMaterial::basic(&consumer.key, &consumer.secret);
        let request = HttpRequest {
            method: Method::Post,
            url: self.endpoints().token.to_string(),
            authorization: Some(consumer_auth.header_value()),
            body: Some(RequestBody::Form(vec![
                ("grant_type".to_string(), "password".to_string()),
                ("username".to_string(), credential.email.clone()),
                (
                    "password".to_string(),
                    credential.password.expose_secret().to_string(),
                ),
            ])),
        };

        let response = self.transport().send(request).await?;
        if !response.is_success() {
            return Err(BucketError::AuthenticationFailed(describe_token_error(
                &response.body,
            )));
        }

        let token: TokenResponse = serde_json::from_str(&response.body).map_err(|e| {
            BucketError::InvalidResponse(format!("token response without access_token: {}", e))
        })?;

        Ok(SecretString::from(token.access_token))
    }
}
