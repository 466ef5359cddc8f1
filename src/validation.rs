use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const NAME_MIN_CHARS: usize = 2;
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 1000;

pub const NAME_TOO_SHORT: &str = "Name must be at least 2 characters long";
pub const EMAIL_INVALID: &str = "Please enter a valid email address";
pub const MESSAGE_TOO_SHORT: &str = "Message must be at least 10 characters long";
pub const MESSAGE_TOO_LONG: &str = "Message must be less than 1000 characters";

// Browser whitespace: Unicode White_Space minus U+0085, plus U+FEFF.
const NOT_SPACE_OR_AT: &str =
    r"[^\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}@]";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let part = NOT_SPACE_OR_AT;
    Regex::new(&format!(r"^{part}+@{part}+\.{part}+$")).expect("email pattern is a valid regex")
});

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormData {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl FormData {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Message => &self.message,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Message => &mut self.message,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::Message => self.message.as_deref(),
        }
    }

    pub fn set(&mut self, field: Field, error: Option<String>) {
        match field {
            Field::Name => self.name = error,
            Field::Email => self.email = error,
            Field::Message => self.message = error,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.message.is_none()
    }

    pub fn len(&self) -> usize {
        Field::ALL
            .iter()
            .filter(|field| self.get(**field).is_some())
            .count()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: FieldErrors,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn validate_field(form: &FormData, field: Field) -> Option<&'static str> {
    match field {
        Field::Name => (trimmed_len(&form.name) < NAME_MIN_CHARS).then_some(NAME_TOO_SHORT),
        Field::Email => (!is_valid_email(&form.email)).then_some(EMAIL_INVALID),
        Field::Message => {
            let length = trimmed_len(&form.message);
            let mut error = None;
            if length < MESSAGE_MIN_CHARS {
                error = Some(MESSAGE_TOO_SHORT);
            }
            if length > MESSAGE_MAX_CHARS {
                error = Some(MESSAGE_TOO_LONG);
            }
            error
        }
    }
}

/// Evaluates every field; errors never short-circuit each other.
pub fn validate(form: &FormData) -> ValidationResult {
    let mut errors = FieldErrors::default();
    for field in Field::ALL {
        errors.set(field, validate_field(form, field).map(str::to_string));
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Trims the whitespace a browser strips from form input, which includes
/// U+FEFF but not U+0085.
pub fn trim_field(value: &str) -> &str {
    value.trim_matches(is_form_whitespace)
}

/// Trimmed length in UTF-16 code units, the way the browser counts input.
pub fn trimmed_len(value: &str) -> usize {
    trim_field(value).encode_utf16().count()
}

fn is_form_whitespace(c: char) -> bool {
    (c.is_whitespace() && c != '\u{0085}') || c == '\u{FEFF}'
}
