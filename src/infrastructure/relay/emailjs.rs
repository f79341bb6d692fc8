use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::{
    entities::contact::{ContactForm, RelayCredentials},
    errors::RelayError,
    repositories::relay::EmailRelay,
};

/// Template variables expected by the contact email template.
#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    from_name: &'a str,
    from_email: &'a str,
    subject: &'a str,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

impl<'a> SendRequest<'a> {
    fn new(credentials: &'a RelayCredentials, form: &'a ContactForm) -> Self {
        SendRequest {
            service_id: &credentials.service_id,
            template_id: &credentials.template_id,
            user_id: &credentials.public_key,
            template_params: TemplateParams {
                from_name: &form.name,
                from_email: &form.email,
                subject: &form.subject,
                message: &form.message,
            },
        }
    }
}

/// Client for an EmailJS-compatible `send` endpoint.
#[derive(Debug, Clone)]
pub struct EmailJsRelay {
    client: Client,
    endpoint: String,
}

impl EmailJsRelay {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(EmailJsRelay {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl EmailRelay for EmailJsRelay {
    async fn deliver(&self, credentials: &RelayCredentials, form: &ContactForm) -> Result<(), RelayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SendRequest::new(credentials, form))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(RelayError::Rejected(status.as_u16(), body))
    }
}
