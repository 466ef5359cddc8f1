use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use portfolio_interactions::{
    config::{
        parse_env_non_empty_string, parse_env_u16, parse_env_u64_with_bounds,
    },
    email::EmailConfig,
    emailjs::{EmailJsClient, DEFAULT_API_BASE},
    submission::{FailureKind, SubmissionOutcome, SubmissionPipeline, DEFAULT_RECIPIENT_NAME},
    validation::FormData,
};
use serde::Serialize;
use std::{
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::time::Instant;
use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_EMAILJS_TIMEOUT_MS: u64 = 8_000;
const DEFAULT_LOG_LEVEL: &str = "info";
const STATIC_DIR: &str = "dist";
const STATIC_INDEX: &str = "dist/index.html";

const EMAILJS_TIMEOUT_MS_BOUNDS: (u64, u64) = (100, 60_000);
const REQUEST_ID_HEADER: &str = "x-request-id";
const MALFORMED_REQUEST_MESSAGE: &str = "Malformed contact request.";

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Debug)]
struct ServerRuntimeConfig {
    port: u16,
    emailjs_api_base: Url,
    emailjs_timeout: Duration,
    recipient_name: String,
    log_level: String,
}

impl ServerRuntimeConfig {
    fn from_env() -> Result<Self, url::ParseError> {
        let port = parse_env_u16("PORT", DEFAULT_PORT);
        let emailjs_timeout_ms = parse_env_u64_with_bounds(
            "EMAILJS_TIMEOUT_MS",
            DEFAULT_EMAILJS_TIMEOUT_MS,
            EMAILJS_TIMEOUT_MS_BOUNDS,
        );
        let emailjs_api_base = match parse_env_http_url("EMAILJS_API_BASE") {
            Some(url) => url,
            None => Url::parse(DEFAULT_API_BASE)?,
        };
        let recipient_name = parse_env_non_empty_string("CONTACT_RECIPIENT_NAME")
            .unwrap_or_else(|| DEFAULT_RECIPIENT_NAME.to_string());
        let log_level = parse_env_non_empty_string("LOG_LEVEL")
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            port,
            emailjs_api_base,
            emailjs_timeout: Duration::from_millis(emailjs_timeout_ms),
            recipient_name,
            log_level,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<SubmissionPipeline<EmailJsClient>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactStatus {
    configured: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestErrorPayload {
    success: bool,
    message: &'static str,
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerRuntimeConfig::from_env()?;
    init_tracing(&config.log_level);

    let email_config = EmailConfig::from_env();
    let client = EmailJsClient::new(&config.emailjs_api_base, &email_config, config.emailjs_timeout)?;
    let pipeline = SubmissionPipeline::new(email_config, client)
        .with_recipient_name(config.recipient_name.clone());

    if !pipeline.is_provider_configured() {
        tracing::warn!(
            event = "email_provider_unconfigured",
            "EMAILJS_SERVICE_ID, EMAILJS_TEMPLATE_ID or EMAILJS_PUBLIC_KEY is unset; contact submissions will be refused"
        );
    }

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    let static_service = ServeDir::new(STATIC_DIR).not_found_service(ServeFile::new(STATIC_INDEX));

    let app = Router::new()
        .route("/api/contact", post(submit_contact))
        .route("/api/contact/status", get(contact_status))
        .fallback_service(static_service)
        .with_state(state);

    let bind_address = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!(
        event = "server_listening",
        address = %bind_address,
        emailjs_api_base = %config.emailjs_api_base,
    );
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .try_init();
}

async fn contact_status(State(state): State<AppState>, headers: HeaderMap) -> axum::response::Response {
    let request_id = resolve_request_id(&headers);
    json_response(
        StatusCode::OK,
        ContactStatus {
            configured: state.pipeline.is_provider_configured(),
        },
        &request_id,
    )
}

async fn submit_contact(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    payload: Result<Json<FormData>, JsonRejection>,
) -> axum::response::Response {
    let request_started_at = Instant::now();
    let request_id = resolve_request_id(&headers);

    tracing::info!(
        event = "contact_request_start",
        request_id = request_id.as_str(),
        method = method.as_str(),
        path = uri.path(),
    );

    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => {
            tracing::info!(
                event = "contact_request_failed",
                request_id = request_id.as_str(),
                error_class = "malformed_request",
                message = %rejection,
                duration_ms = request_started_at.elapsed().as_millis() as u64,
            );
            return json_response(
                StatusCode::BAD_REQUEST,
                RequestErrorPayload {
                    success: false,
                    message: MALFORMED_REQUEST_MESSAGE,
                },
                &request_id,
            );
        }
    };

    let outcome = state.pipeline.submit(&form).await;
    let status = status_for_outcome(&outcome);

    tracing::info!(
        event = "contact_request_complete",
        request_id = request_id.as_str(),
        status = status.as_u16(),
        success = outcome.success,
        failure = outcome.failure.map(failure_class),
        duration_ms = request_started_at.elapsed().as_millis() as u64,
    );

    json_response(status, outcome, &request_id)
}

fn status_for_outcome(outcome: &SubmissionOutcome) -> StatusCode {
    if outcome.success {
        return StatusCode::OK;
    }

    match outcome.failure {
        Some(FailureKind::Validation) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(FailureKind::Configuration) => StatusCode::SERVICE_UNAVAILABLE,
        Some(FailureKind::Provider) => StatusCode::BAD_GATEWAY,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure_class(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Validation => "validation",
        FailureKind::Configuration => "config_missing",
        FailureKind::Provider => "provider_failed",
    }
}

fn json_response(
    status: StatusCode,
    payload: impl Serialize,
    request_id: &str,
) -> axum::response::Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    if let Ok(request_id_header) = HeaderValue::from_str(request_id) {
        headers.insert(REQUEST_ID_HEADER, request_id_header);
    }
    (status, headers, Json(payload)).into_response()
}

fn parse_env_http_url(name: &str) -> Option<Url> {
    parse_http_url(&parse_env_non_empty_string(name)?)
}

fn parse_http_url(value: &str) -> Option<Url> {
    let parsed = Url::parse(value).ok()?;

    if parsed.scheme() == "http" || parsed.scheme() == "https" {
        Some(parsed)
    } else {
        None
    }
}

fn now_unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis())
        .unwrap_or(0)
}

fn generate_request_id() -> String {
    let counter = REQUEST_ID_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
    format!("req-{}-{counter}", now_unix_millis())
}

fn resolve_request_id(headers: &HeaderMap) -> String {
    let value = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|raw| raw.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string);

    value.unwrap_or_else(generate_request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_interactions::{
        email::{ProviderError, ProviderResponse},
        submission::{NOT_CONFIGURED_MESSAGE, VALIDATION_FAILED_MESSAGE},
        validation::FieldErrors,
    };

    fn test_state(email_config: EmailConfig) -> AppState {
        let base = Url::parse("http://127.0.0.1:9/").expect("valid URL");
        let client =
            EmailJsClient::new(&base, &email_config, Duration::from_millis(200)).expect("client builds");
        AppState {
            pipeline: Arc::new(SubmissionPipeline::new(email_config, client)),
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn jane() -> FormData {
        FormData::new(
            "Jane Doe",
            "jane@example.com",
            "Hello, I would like to collaborate on a project.",
        )
    }

    #[test]
    fn request_id_is_echoed_or_generated() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("  abc-123 "));
        assert_eq!(resolve_request_id(&headers), "abc-123");

        let generated = resolve_request_id(&HeaderMap::new());
        assert!(generated.starts_with("req-"));
        assert_ne!(generated, resolve_request_id(&HeaderMap::new()));
    }

    #[test]
    fn outcomes_map_to_distinct_statuses() {
        assert_eq!(
            status_for_outcome(&SubmissionOutcome::sent(ProviderResponse {
                status: 200,
                text: "OK".to_string(),
            })),
            StatusCode::OK
        );
        assert_eq!(
            status_for_outcome(&SubmissionOutcome::invalid(FieldErrors::default())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for_outcome(&SubmissionOutcome::not_configured()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for_outcome(&SubmissionOutcome::provider_failed(ProviderError::Unknown)),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn only_http_urls_are_accepted_as_api_base() {
        assert!(parse_http_url("https://api.emailjs.com").is_some());
        assert!(parse_http_url("ftp://api.emailjs.com").is_none());
        assert!(parse_http_url("not a url").is_none());
        assert_eq!(
            parse_http_url(DEFAULT_API_BASE).map(String::from),
            Some("https://api.emailjs.com/".to_string())
        );
    }

    #[tokio::test]
    async fn status_endpoint_reports_configuration() {
        let response = contact_status(
            State(test_state(EmailConfig::placeholders())),
            HeaderMap::new(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );
        assert_eq!(body_json(response).await, serde_json::json!({ "configured": false }));
    }

    #[tokio::test]
    async fn invalid_submission_is_unprocessable() {
        let response = submit_contact(
            State(test_state(EmailConfig::new("service_abc", "template_xyz", "pk_123"))),
            Method::POST,
            Uri::from_static("/api/contact"),
            HeaderMap::new(),
            Ok(Json(FormData::new("a", "bad", "short"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["failure"], "validation");
        assert_eq!(body["message"], VALIDATION_FAILED_MESSAGE);
        assert!(body["errors"]["email"].is_string());
    }

    #[tokio::test]
    async fn unconfigured_provider_is_unavailable() {
        let response = submit_contact(
            State(test_state(EmailConfig::placeholders())),
            Method::POST,
            Uri::from_static("/api/contact"),
            HeaderMap::new(),
            Ok(Json(jane())),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["failure"], "configuration");
        assert_eq!(body["message"], NOT_CONFIGURED_MESSAGE);
    }
}
