use std::sync::Arc;

use async_trait::async_trait;

use crate::{entities::token::OAuthProfile, errors::AuthError};

/// Exchanges a provider access token (obtained by the browser's OAuth popup)
/// for the visitor's profile.
#[async_trait]
pub trait OAuthProfileProvider: Send + Sync {
    async fn fetch_profile(&self, access_token: &str) -> Result<OAuthProfile, AuthError>;
}

#[async_trait]
impl<T> OAuthProfileProvider for Arc<T>
where
    T: OAuthProfileProvider + ?Sized,
{
    async fn fetch_profile(&self, access_token: &str) -> Result<OAuthProfile, AuthError> {
        (**self).fetch_profile(access_token).await
    }
}

pub type SharedProfileProvider = Arc<dyn OAuthProfileProvider>;
