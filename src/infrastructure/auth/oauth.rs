use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::{
    entities::token::OAuthProfile,
    errors::AuthError,
    repositories::identity::OAuthProfileProvider,
};

/// Resolves provider access tokens through an OpenID Connect userinfo endpoint.
#[derive(Debug, Clone)]
pub struct UserInfoClient {
    client: Client,
    userinfo_url: String,
}

impl UserInfoClient {
    pub fn new(userinfo_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(UserInfoClient {
            client,
            userinfo_url: userinfo_url.into(),
        })
    }
}

#[async_trait]
impl OAuthProfileProvider for UserInfoClient {
    async fn fetch_profile(&self, access_token: &str) -> Result<OAuthProfile, AuthError> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Userinfo request failed: {}", e);
                AuthError::OAuthRejected("identity provider unreachable".into())
            })?;

        match response.status() {
            StatusCode::OK => response.json::<OAuthProfile>().await.map_err(|e| {
                tracing::warn!("Userinfo response unreadable: {}", e);
                AuthError::OAuthRejected("unexpected profile format".into())
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AuthError::OAuthRejected("access token not accepted".into()))
            }
            status => {
                tracing::warn!(%status, "Userinfo endpoint returned an error");
                Err(AuthError::OAuthRejected(format!("provider returned {}", status.as_u16())))
            }
        }
    }
}
