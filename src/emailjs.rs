use std::{future::Future, time::Duration};

use reqwest::redirect::Policy;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::email::{EmailConfig, EmailProvider, ProviderError, ProviderResponse, TemplateParams};

pub const DEFAULT_API_BASE: &str = "https://api.emailjs.com";
const SEND_PATH: &str = "api/v1.0/email/send";
const USER_AGENT: &str = "portfolio-contact-relay/1.0";

#[derive(Debug, Error)]
pub enum EmailJsSetupError {
    #[error("invalid EmailJS API base URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("failed to prepare EmailJS HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: &'a TemplateParams,
}

#[derive(Clone, Debug)]
pub struct EmailJsClient {
    client: reqwest::Client,
    endpoint: Url,
    public_key: String,
    access_token: Option<String>,
}

impl EmailJsClient {
    pub fn new(
        api_base: &Url,
        config: &EmailConfig,
        timeout: Duration,
    ) -> Result<Self, EmailJsSetupError> {
        let endpoint = api_base.join(SEND_PATH)?;
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            public_key: config.public_key.clone(),
            access_token: config.access_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl EmailProvider for EmailJsClient {
    fn send(
        &self,
        service_id: &str,
        template_id: &str,
        params: &TemplateParams,
    ) -> impl Future<Output = Result<ProviderResponse, ProviderError>> + Send {
        let request = self.client.post(self.endpoint.clone()).json(&SendRequest {
            service_id,
            template_id,
            user_id: &self.public_key,
            access_token: self.access_token.as_deref(),
            template_params: params,
        });

        async move {
            let response = request
                .send()
                .await
                .map_err(|error| ProviderError::Transport {
                    message: error.to_string(),
                })?;
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            if status.is_success() {
                Ok(ProviderResponse {
                    status: status.as_u16(),
                    text,
                })
            } else {
                Err(ProviderError::Rejected {
                    status: status.as_u16(),
                    text: text.trim().to_string(),
                })
            }
        }
    }
}
