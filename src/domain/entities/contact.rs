use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{entities::validation::validate_not_blank, settings::AppConfig};

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ContactForm {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 150), custom(function = "validate_not_blank"))]
    #[serde(default)]
    pub subject: String,

    #[validate(length(min = 5, max = 2000))]
    pub message: String,
}

/// Relay account identifiers. Only constructed when every value is present.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayCredentials {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

impl RelayCredentials {
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Some(RelayCredentials {
            service_id: present(&config.relay_service_id)?,
            template_id: present(&config.relay_template_id)?,
            public_key: present(&config.relay_public_key)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub message: &'static str,
}
