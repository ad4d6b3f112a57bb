//! Current user lookup

use serde::Deserialize;

use crate::bitbucket::client::{BitbucketClient, EndpointRequest, HttpRequest, Method, Transport};
use crate::core::session::AuthMaterial;
use crate::error::{BucketError, Result};

/// The authenticated Bitbucket account
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub display_name: String,
    /// Account nickname; older payloads call it `username`
    #[serde(default, alias = "username")]
    pub nickname: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
}

impl<T: Transport> BitbucketClient<T> {
    /// Fetch the user for the active session
    pub async fn current_user(&self) -> Result<User> {
        self.invoke_as(&EndpointRequest::get("user")).await
    }

    /// Fetch the user behind auth material that has no session yet
    ///
    /// A 401 or 403 means the credentials were rejected.
    pub(crate) async fn fetch_user_with(&self, auth: &AuthMaterial) -> Result<User> {
        let url = self.endpoints().api.join("user")?;
        let request = HttpRequest {
            method: Method::Get,
            url: url.to_string(),
            authorization: Some(auth.header_value()),
            body: None,
        };

        match self.execute(request).await {
            Ok(value) => Ok(serde_json::from_value(value)?),
            Err(BucketError::Api {
                status: 401 | 403,
                payload,
            }) => Err(BucketError::AuthenticationFailed(payload)),
            Err(e) => Err(e),
        }
    }
}
