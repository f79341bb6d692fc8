use std::sync::Arc;

use async_trait::async_trait;

use crate::{entities::contact::{ContactForm, RelayCredentials}, errors::RelayError};

/// Third-party transactional email service that forwards contact forms.
#[async_trait]
pub trait EmailRelay: Send + Sync {
    async fn deliver(&self, credentials: &RelayCredentials, form: &ContactForm) -> Result<(), RelayError>;
}

#[async_trait]
impl<T> EmailRelay for Arc<T>
where
    T: EmailRelay + ?Sized,
{
    async fn deliver(&self, credentials: &RelayCredentials, form: &ContactForm) -> Result<(), RelayError> {
        (**self).deliver(credentials, form).await
    }
}

pub type SharedRelay = Arc<dyn EmailRelay>;
