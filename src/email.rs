use std::{fmt, future::Future};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::parse_env_non_empty_string;

pub const SERVICE_ID_PLACEHOLDER: &str = "YOUR_SERVICE_ID";
pub const TEMPLATE_ID_PLACEHOLDER: &str = "YOUR_TEMPLATE_ID";
pub const PUBLIC_KEY_PLACEHOLDER: &str = "YOUR_PUBLIC_KEY";

#[derive(Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    /// EmailJS private key, required when the account enforces strict mode
    /// for server-side calls.
    pub access_token: Option<String>,
}

impl EmailConfig {
    pub fn new(
        service_id: impl Into<String>,
        template_id: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            template_id: template_id.into(),
            public_key: public_key.into(),
            access_token: None,
        }
    }

    pub fn placeholders() -> Self {
        Self::new(
            SERVICE_ID_PLACEHOLDER,
            TEMPLATE_ID_PLACEHOLDER,
            PUBLIC_KEY_PLACEHOLDER,
        )
    }

    pub fn from_env() -> Self {
        Self {
            service_id: parse_env_non_empty_string("EMAILJS_SERVICE_ID")
                .unwrap_or_else(|| SERVICE_ID_PLACEHOLDER.to_string()),
            template_id: parse_env_non_empty_string("EMAILJS_TEMPLATE_ID")
                .unwrap_or_else(|| TEMPLATE_ID_PLACEHOLDER.to_string()),
            public_key: parse_env_non_empty_string("EMAILJS_PUBLIC_KEY")
                .unwrap_or_else(|| PUBLIC_KEY_PLACEHOLDER.to_string()),
            access_token: parse_env_non_empty_string("EMAILJS_PRIVATE_KEY"),
        }
    }

    /// All three identifiers are set and none is still a placeholder.
    pub fn is_configured(&self) -> bool {
        is_set(&self.service_id, SERVICE_ID_PLACEHOLDER)
            && is_set(&self.template_id, TEMPLATE_ID_PLACEHOLDER)
            && is_set(&self.public_key, PUBLIC_KEY_PLACEHOLDER)
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self::placeholders()
    }
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("service_id", &self.service_id)
            .field("template_id", &self.template_id)
            .field("public_key", &"<redacted>")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn is_set(value: &str, placeholder: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != placeholder
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParams {
    pub from_name: String,
    pub from_email: String,
    pub message: String,
    pub to_name: String,
    pub reply_to: String,
    pub timestamp: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub status: u16,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("email provider rejected the request ({status}): {text}")]
    Rejected { status: u16, text: String },
    /// The request never produced a provider answer.
    #[error("email provider unreachable: {message}")]
    Transport { message: String },
    #[error("email provider failed without details")]
    Unknown,
}

impl ProviderError {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Rejected { text, .. } => Some(text.as_str()).filter(|text| !text.trim().is_empty()),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Transport { message } => {
                Some(message.as_str()).filter(|message| !message.trim().is_empty())
            }
            _ => None,
        }
    }
}

/// A single outbound send. Implementations must not retry on their own.
pub trait EmailProvider: Send + Sync {
    fn send(
        &self,
        service_id: &str,
        template_id: &str,
        params: &TemplateParams,
    ) -> impl Future<Output = Result<ProviderResponse, ProviderError>> + Send;
}
