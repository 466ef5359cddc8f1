//! Contact submission pipeline: validate, check provider configuration, send
//! once, and fold every failure into a [`SubmissionOutcome`].

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    email::{EmailConfig, EmailProvider, ProviderError, ProviderResponse, TemplateParams},
    validation::{trim_field, validate, FieldErrors, FormData},
};

pub const DEFAULT_RECIPIENT_NAME: &str = "Avani Kulkarni";

pub const SUCCESS_MESSAGE: &str = "Email sent successfully! Thank you for your message.";
pub const VALIDATION_FAILED_MESSAGE: &str = "Please fix the errors in the form before submitting.";
pub const NOT_CONFIGURED_MESSAGE: &str =
    "Email service is not configured. Please complete the EmailJS setup before accepting messages.";
pub const CONFIGURATION_ERROR_MESSAGE: &str =
    "Email service configuration error. Please contact the site administrator.";
pub const AUTHENTICATION_ERROR_MESSAGE: &str =
    "Email service authentication failed. Please contact the site administrator.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to send email. Please try again.";

/// Asia/Kolkata, which has no daylight saving.
const TIMESTAMP_OFFSET_SECONDS: i32 = 5 * 3_600 + 30 * 60;
const TIMESTAMP_FORMAT: &str = "%B %-d, %Y at %I:%M %p";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The visitor's input was rejected; nothing was sent.
    Validation,
    /// The site owner has not finished provider setup; nothing was sent.
    Configuration,
    /// The provider call was made and failed.
    Provider,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ProviderResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ProviderError>,
}

impl SubmissionOutcome {
    pub fn sent(response: ProviderResponse) -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            failure: None,
            errors: None,
            data: Some(response),
            error: None,
        }
    }

    pub fn invalid(errors: FieldErrors) -> Self {
        Self::failed(FailureKind::Validation, VALIDATION_FAILED_MESSAGE.to_string())
            .with_errors(errors)
    }

    pub fn not_configured() -> Self {
        Self::failed(FailureKind::Configuration, NOT_CONFIGURED_MESSAGE.to_string())
    }

    pub fn provider_failed(error: ProviderError) -> Self {
        let mut outcome = Self::failed(FailureKind::Provider, describe_provider_error(&error));
        outcome.error = Some(error);
        outcome
    }

    fn failed(kind: FailureKind, message: String) -> Self {
        Self {
            success: false,
            message,
            failure: Some(kind),
            errors: None,
            data: None,
            error: None,
        }
    }

    fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }
}

pub fn describe_provider_error(error: &ProviderError) -> String {
    if let Some(text) = error.text() {
        return match text {
            "Invalid template ID" | "Invalid service ID" => CONFIGURATION_ERROR_MESSAGE.to_string(),
            "Unauthorized" => AUTHENTICATION_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        };
    }

    error
        .message()
        .map(ToString::to_string)
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}

pub fn format_timestamp(now: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(TIMESTAMP_OFFSET_SECONDS) {
        Some(offset) => now.with_timezone(&offset).format(TIMESTAMP_FORMAT).to_string(),
        None => now.format(TIMESTAMP_FORMAT).to_string(),
    }
}

pub struct SubmissionPipeline<P> {
    config: EmailConfig,
    provider: P,
    recipient_name: String,
}

impl<P: EmailProvider> SubmissionPipeline<P> {
    pub fn new(config: EmailConfig, provider: P) -> Self {
        Self {
            config,
            provider,
            recipient_name: DEFAULT_RECIPIENT_NAME.to_string(),
        }
    }

    pub fn with_recipient_name(mut self, recipient_name: impl Into<String>) -> Self {
        self.recipient_name = recipient_name.into();
        self
    }

    pub fn is_provider_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub async fn submit(&self, form: &FormData) -> SubmissionOutcome {
        self.submit_at(form, Utc::now()).await
    }

    /// Runs one submission with an explicit clock reading.
    pub async fn submit_at(&self, form: &FormData, now: DateTime<Utc>) -> SubmissionOutcome {
        let validation = validate(form);
        if !validation.is_valid {
            tracing::debug!(
                event = "contact_submission_invalid",
                invalid_fields = validation.errors.len(),
            );
            return SubmissionOutcome::invalid(validation.errors);
        }

        if !self.is_provider_configured() {
            tracing::warn!(
                event = "contact_submission_failed",
                error_class = "config_missing",
                "email provider is not configured"
            );
            return SubmissionOutcome::not_configured();
        }

        let params = self.template_params(form, now);
        match self
            .provider
            .send(&self.config.service_id, &self.config.template_id, &params)
            .await
        {
            Ok(response) => {
                tracing::info!(
                    event = "contact_submission_sent",
                    provider_status = response.status,
                );
                SubmissionOutcome::sent(response)
            }
            Err(error) => {
                tracing::warn!(
                    event = "contact_submission_failed",
                    error_class = "provider_failed",
                    error = %error,
                );
                SubmissionOutcome::provider_failed(error)
            }
        }
    }

    fn template_params(&self, form: &FormData, now: DateTime<Utc>) -> TemplateParams {
        TemplateParams {
            from_name: trim_field(&form.name).to_string(),
            from_email: trim_field(&form.email).to_string(),
            message: trim_field(&form.message).to_string(),
            to_name: self.recipient_name.clone(),
            reply_to: form.email.clone(),
            timestamp: format_timestamp(now),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{configured, RecordingProvider};
    use super::*;
    use crate::{
        form::ContactForm,
        validation::{Field, EMAIL_INVALID, MESSAGE_TOO_SHORT, NAME_TOO_SHORT},
    };
    use chrono::TimeZone;

    fn jane() -> FormData {
        FormData::new(
            "Jane Doe",
            "jane@example.com",
            "Hello, I would like to collaborate on a project.",
        )
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 10, 15, 0)
            .single()
            .expect("valid instant")
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_provider() {
        let provider = RecordingProvider::succeeding();
        let pipeline = SubmissionPipeline::new(configured(), provider.clone());

        let outcome = pipeline.submit(&FormData::new("a", "bad", "short")).await;

        assert!(!outcome.success);
        assert_eq!(outcome.failure, Some(FailureKind::Validation));
        assert_eq!(outcome.message, VALIDATION_FAILED_MESSAGE);
        let errors = outcome.errors.expect("field errors reported");
        assert_eq!(errors.name.as_deref(), Some(NAME_TOO_SHORT));
        assert_eq!(errors.email.as_deref(), Some(EMAIL_INVALID));
        assert_eq!(errors.message.as_deref(), Some(MESSAGE_TOO_SHORT));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn happy_path_sends_once_and_clears_form() {
        let provider = RecordingProvider::succeeding();
        let pipeline = SubmissionPipeline::new(configured(), provider.clone());
        let mut form = ContactForm::default();
        for field in Field::ALL {
            form.update_field(field, jane().field(field));
        }

        let submitted = form.begin_submit().expect("valid form submits");
        let outcome = pipeline.submit(&submitted).await;

        assert!(outcome.success);
        assert!(!outcome.message.is_empty());
        assert_eq!(outcome.data.as_ref().map(|data| data.status), Some(200));
        assert_eq!(provider.calls(), 1);

        form.finish_submit(outcome);
        let cleared = validate(form.data());
        assert!(!cleared.is_valid);
        assert_eq!(cleared.errors.len(), 3);
    }

    #[tokio::test]
    async fn placeholder_config_fails_distinctly_without_sending() {
        let provider = RecordingProvider::succeeding();
        let pipeline = SubmissionPipeline::new(EmailConfig::placeholders(), provider.clone());

        let outcome = pipeline.submit(&jane()).await;

        assert!(!outcome.success);
        assert_eq!(outcome.failure, Some(FailureKind::Configuration));
        assert_eq!(outcome.message, NOT_CONFIGURED_MESSAGE);
        for field_message in [NAME_TOO_SHORT, EMAIL_INVALID, MESSAGE_TOO_SHORT, VALIDATION_FAILED_MESSAGE] {
            assert_ne!(outcome.message, field_message);
        }
        assert!(outcome.errors.is_none());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn validation_runs_before_configuration_check() {
        let provider = RecordingProvider::succeeding();
        let pipeline = SubmissionPipeline::new(EmailConfig::placeholders(), provider.clone());

        let outcome = pipeline.submit(&FormData::default()).await;

        assert_eq!(outcome.failure, Some(FailureKind::Validation));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn payload_is_trimmed_and_stamped() {
        let provider = RecordingProvider::succeeding();
        let pipeline =
            SubmissionPipeline::new(configured(), provider.clone()).with_recipient_name("Site Owner");
        let form = FormData::new("  Jane Doe ", "jane@example.com", "\n Hello, I would like to talk. \n");

        pipeline.submit_at(&form, fixed_now()).await;

        let (service_id, template_id, params) = provider.last_sent().expect("one send");
        assert_eq!(service_id, "service_abc");
        assert_eq!(template_id, "template_xyz");
        assert_eq!(
            params,
            TemplateParams {
                from_name: "Jane Doe".to_string(),
                from_email: "jane@example.com".to_string(),
                message: "Hello, I would like to talk.".to_string(),
                to_name: "Site Owner".to_string(),
                reply_to: "jane@example.com".to_string(),
                timestamp: "October 19, 2026 at 03:45 PM".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn provider_failure_resolves_with_mapped_message() {
        let cases = [
            (
                ProviderError::Rejected { status: 400, text: "Invalid template ID".to_string() },
                CONFIGURATION_ERROR_MESSAGE,
            ),
            (
                ProviderError::Rejected { status: 400, text: "Invalid service ID".to_string() },
                CONFIGURATION_ERROR_MESSAGE,
            ),
            (
                ProviderError::Rejected { status: 401, text: "Unauthorized".to_string() },
                AUTHENTICATION_ERROR_MESSAGE,
            ),
            (
                ProviderError::Rejected { status: 429, text: "Too many requests".to_string() },
                "Too many requests",
            ),
            (
                ProviderError::Transport { message: "connection reset by peer".to_string() },
                "connection reset by peer",
            ),
            (
                ProviderError::Rejected { status: 500, text: String::new() },
                GENERIC_FAILURE_MESSAGE,
            ),
            (ProviderError::Unknown, GENERIC_FAILURE_MESSAGE),
        ];

        for (error, expected) in cases {
            let provider = RecordingProvider::failing(error.clone());
            let pipeline = SubmissionPipeline::new(configured(), provider.clone());

            let outcome = pipeline.submit(&jane()).await;

            assert!(!outcome.success);
            assert_eq!(outcome.failure, Some(FailureKind::Provider));
            assert_eq!(outcome.message, expected);
            assert_eq!(outcome.error, Some(error));
            assert_eq!(provider.calls(), 1, "no automatic retry");
        }
    }

    #[test]
    fn timestamp_uses_fixed_indian_offset() {
        let late = Utc
            .with_ymd_and_hms(2026, 12, 31, 19, 0, 0)
            .single()
            .expect("valid instant");
        assert_eq!(format_timestamp(late), "January 1, 2027 at 12:30 AM");
    }

    #[test]
    fn outcome_json_omits_absent_parts() {
        let json = serde_json::to_value(SubmissionOutcome::not_configured()).expect("serializable");
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "message": NOT_CONFIGURED_MESSAGE,
                "failure": "configuration",
            })
        );

        let round_trip: SubmissionOutcome = serde_json::from_value(
            serde_json::to_value(SubmissionOutcome::sent(ProviderResponse {
                status: 200,
                text: "OK".to_string(),
            }))
            .expect("serializable"),
        )
        .expect("deserializable");
        assert!(round_trip.success);
        assert_eq!(round_trip.message, SUCCESS_MESSAGE);
    }
}
