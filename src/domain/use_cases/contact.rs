use validator::Validate;

use crate::{
    entities::contact::{ContactForm, ContactResponse, RelayCredentials},
    errors::{AppError, RELAY_NOT_CONFIGURED},
    repositories::relay::EmailRelay,
};

pub struct ContactHandler<R>
where
    R: EmailRelay,
{
    pub relay: R,
    pub credentials: Option<RelayCredentials>,
}

impl<R> ContactHandler<R>
where
    R: EmailRelay,
{
    pub fn new(relay: R, credentials: Option<RelayCredentials>) -> Self {
        if credentials.is_none() {
            tracing::warn!("Email relay credentials missing, contact form disabled");
        }
        ContactHandler { relay, credentials }
    }

    /// Forwards a contact form through the relay. Without credentials nothing
    /// is sent.
    pub async fn submit(&self, form: ContactForm) -> Result<ContactResponse, AppError> {
        form.validate()?;

        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| AppError::ConfigMissing(RELAY_NOT_CONFIGURED.to_string()))?;

        self.relay.deliver(credentials, &form).await?;
        tracing::info!("Contact message relayed");

        Ok(ContactResponse {
            message: "Message sent successfully! I'll get back to you soon.",
        })
    }
}
