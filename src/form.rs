use crate::{
    submission::{SubmissionOutcome, NOT_CONFIGURED_MESSAGE, VALIDATION_FAILED_MESSAGE},
    validation::{validate, validate_field, Field, FieldErrors, FormData},
};

pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Touched {
    name: bool,
    email: bool,
    message: bool,
}

impl Touched {
    fn get(&self, field: Field) -> bool {
        match field {
            Field::Name => self.name,
            Field::Email => self.email,
            Field::Message => self.message,
        }
    }

    fn mark(&mut self, field: Field) {
        match field {
            Field::Name => self.name = true,
            Field::Email => self.email = true,
            Field::Message => self.message = true,
        }
    }

    fn all() -> Self {
        Self {
            name: true,
            email: true,
            message: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContactForm {
    data: FormData,
    touched: Touched,
    errors: FieldErrors,
    notification: Option<Notification>,
    phase: SubmissionPhase,
    provider_configured: bool,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self {
            data: FormData::default(),
            touched: Touched::default(),
            errors: FieldErrors::default(),
            notification: None,
            phase: SubmissionPhase::Idle,
            // Assume configured until the server says otherwise.
            provider_configured: true,
        }
    }
}

impl ContactForm {
    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SubmissionPhase::Submitting
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.get(field)
    }

    /// Error to render next to `field`: only once the field was touched.
    pub fn visible_error(&self, field: Field) -> Option<&str> {
        self.errors.get(field).filter(|_| self.touched.get(field))
    }

    pub fn set_provider_configured(&mut self, configured: bool) {
        self.provider_configured = configured;
    }

    pub fn update_field(&mut self, field: Field, value: impl Into<String>) {
        *self.data.field_mut(field) = value.into();
        self.errors.set(field, None);
    }

    pub fn blur_field(&mut self, field: Field) {
        self.touched.mark(field);
        self.errors
            .set(field, validate_field(&self.data, field).map(str::to_string));
    }

    /// Starts a submission. Returns the data to send, or `None` when the
    /// form is invalid, the provider is known to be unconfigured, or a
    /// submission is already in flight.
    pub fn begin_submit(&mut self) -> Option<FormData> {
        if self.is_submitting() {
            return None;
        }

        let validation = validate(&self.data);
        self.errors = validation.errors;
        self.touched = Touched::all();

        if !validation.is_valid {
            self.notification = Some(Notification::error(VALIDATION_FAILED_MESSAGE));
            return None;
        }

        if !self.provider_configured {
            self.notification = Some(Notification::error(NOT_CONFIGURED_MESSAGE));
            return None;
        }

        self.notification = None;
        self.phase = SubmissionPhase::Submitting;
        Some(self.data.clone())
    }

    pub fn finish_submit(&mut self, outcome: SubmissionOutcome) {
        self.phase = SubmissionPhase::Idle;

        if outcome.success {
            self.data = FormData::default();
            self.errors = FieldErrors::default();
            self.touched = Touched::default();
            self.notification = Some(Notification {
                kind: NotificationKind::Success,
                message: outcome.message,
            });
            return;
        }

        if let Some(errors) = outcome.errors {
            self.errors = errors;
            self.touched = Touched::all();
        }
        self.notification = Some(Notification::error(outcome.message));
    }

    pub fn finish_with_unexpected_error(&mut self) {
        self.phase = SubmissionPhase::Idle;
        self.notification = Some(Notification::error(UNEXPECTED_ERROR_MESSAGE));
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }
}
