//! Local guard against clearly malformed contact input. Not RFC 5322.

use std::sync::LazyLock;

use regex::Regex;

use super::{ContactFields, ContactPayload};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]+@([A-Za-z0-9_-]+\.)+[A-Za-z0-9_-]{2,}$")
        .expect("email regex should compile")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    /// Id of the inline error slot next to the input.
    pub fn error_slot(self) -> &'static str {
        match self {
            Self::Name => "nameError",
            Self::Email => "emailError",
            Self::Message => "messageError",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldError {
    Required(Field),
    InvalidEmail,
}

impl FieldError {
    pub fn field(self) -> Field {
        match self {
            Self::Required(field) => field,
            Self::InvalidEmail => Field::Email,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Required(Field::Name) => "Please enter your name.",
            Self::Required(Field::Email) => "Please enter your email address.",
            Self::Required(Field::Message) => "Please enter a message.",
            Self::InvalidEmail => "Enter a valid email address.",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn iter(&self) -> impl Iterator<Item = FieldError> + '_ {
        self.0.iter().copied()
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.iter().find(|err| err.field() == field)
    }
}

/// Contact input that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidContact {
    name: String,
    email: String,
    message: String,
}

impl ValidContact {
    pub fn into_payload(self, created_at: &str) -> ContactPayload {
        ContactPayload {
            name: self.name,
            email: self.email,
            message: self.message,
            created_at: created_at.to_string(),
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

pub fn validate(fields: &ContactFields) -> Result<ValidContact, FieldErrors> {
    let name = fields.name.trim();
    let email = fields.email.trim();
    let message = fields.message.trim();
    let mut errors = Vec::new();

    if name.is_empty() {
        errors.push(FieldError::Required(Field::Name));
    }
    if email.is_empty() {
        errors.push(FieldError::Required(Field::Email));
    } else if !is_valid_email(email) {
        errors.push(FieldError::InvalidEmail);
    }
    if message.is_empty() {
        errors.push(FieldError::Required(Field::Message));
    }

    if !errors.is_empty() {
        return Err(FieldErrors(errors));
    }
    Ok(ValidContact {
        name: name.to_string(),
        email: email.to_string(),
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, email: &str, message: &str) -> ContactFields {
        ContactFields {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last-1@mail.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
    }

    #[test]
    fn empty_email_is_required_not_format() {
        let errors = validate(&fields("Ada", "", "Hello")).unwrap_err();
        assert_eq!(
            errors.get(Field::Email),
            Some(FieldError::Required(Field::Email))
        );
    }

    #[test]
    fn malformed_email_is_format_error() {
        let errors = validate(&fields("Ada", "not-an-email", "Hello")).unwrap_err();
        assert_eq!(errors.iter().collect::<Vec<_>>(), vec![FieldError::InvalidEmail]);
        assert_eq!(
            FieldError::InvalidEmail.message(),
            "Enter a valid email address."
        );
    }

    #[test]
    fn whitespace_only_fields_are_missing() {
        let errors = validate(&fields("   ", " \n", "\t")).unwrap_err();
        assert_eq!(
            errors.iter().map(FieldError::field).collect::<Vec<_>>(),
            Field::ALL.to_vec()
        );
    }

    #[test]
    fn valid_input_is_trimmed_into_payload() {
        let payload = validate(&fields(" Ada ", " a@b.co ", " Hi there "))
            .unwrap()
            .into_payload("2026-10-19T09:00:00.000Z");
        assert_eq!(payload.name, "Ada");
        assert_eq!(payload.email, "a@b.co");
        assert_eq!(payload.message, "Hi there");
        assert_eq!(payload.created_at, "2026-10-19T09:00:00.000Z");
    }
}
