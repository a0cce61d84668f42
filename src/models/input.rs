//! Write inputs and field validation
//!
//! Payloads arrive untyped (JSON bodies or HTML forms) and are turned into
//! `ClientInput` / `SalesRepInput` only after every field rule passes, so the
//! consistency services never see malformed data.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const NAME_MAX_LEN: usize = 200;
pub const EMAIL_MAX_LEN: usize = 200;
pub const NOTES_MAX_LEN: usize = 1000;
pub const PHONE_MAX_LEN: usize = 50;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex");
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input: {}", summarize(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validated client fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInput {
    pub name: String,
    pub contact_email: String,
    pub visit_date: NaiveDateTime,
    pub sales_rep_id: Uuid,
    pub notes: Option<String>,
}

/// Validated sales rep fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesRepInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Raw client body, shared by the JSON API and the HTML form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientPayload {
    pub name: String,
    pub contact_email: String,
    pub visit_date: String,
    pub sales_rep_id: String,
    pub notes: Option<String>,
}

/// Raw sales rep body, shared by the JSON API and the HTML form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SalesRepPayload {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl ClientPayload {
    pub fn validate(self) -> Result<ClientInput, ValidationError> {
        let mut rules = Rules::default();
        let name = rules.required("name", &self.name, NAME_MAX_LEN);
        let contact_email = rules.email("contactEmail", &self.contact_email, EMAIL_MAX_LEN);
        let notes = rules.optional("notes", self.notes.as_deref(), NOTES_MAX_LEN);

        let visit_date = match self.visit_date.trim() {
            "" => {
                rules.fail("visitDate", "is required");
                None
            }
            raw => {
                let parsed = parse_visit_date(raw);
                if parsed.is_none() {
                    rules.fail("visitDate", "must be an ISO-8601 date or date-time");
                }
                parsed
            }
        };

        let sales_rep_id = match self.sales_rep_id.trim() {
            "" => {
                rules.fail("salesRepId", "is required");
                None
            }
            raw => {
                let parsed = Uuid::parse_str(raw).ok();
                if parsed.is_none() {
                    rules.fail("salesRepId", "must be a UUID");
                }
                parsed
            }
        };

        match (visit_date, sales_rep_id) {
            (Some(visit_date), Some(sales_rep_id)) if rules.errors.is_empty() => Ok(ClientInput {
                name,
                contact_email,
                visit_date,
                sales_rep_id,
                notes,
            }),
            _ => Err(ValidationError { errors: rules.errors }),
        }
    }
}

impl SalesRepPayload {
    pub fn validate(self) -> Result<SalesRepInput, ValidationError> {
        let mut rules = Rules::default();
        let name = rules.required("name", &self.name, NAME_MAX_LEN);
        let email = rules.email("email", &self.email, EMAIL_MAX_LEN);
        let phone = rules.optional("phone", self.phone.as_deref(), PHONE_MAX_LEN);
        rules.finish()?;
        Ok(SalesRepInput { name, email, phone })
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS[.f]]` and RFC 3339 timestamps
/// (converted to UTC).
pub fn parse_visit_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = raw.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

#[derive(Default)]
struct Rules {
    errors: Vec<FieldError>,
}

impl Rules {
    fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError { field, message: message.into() });
    }

    fn required(&mut self, field: &'static str, value: &str, max: usize) -> String {
        let value = value.trim();
        if value.is_empty() {
            self.fail(field, "is required");
        } else if value.chars().count() > max {
            self.fail(field, format!("must be at most {} characters", max));
        }
        value.to_string()
    }

    fn email(&mut self, field: &'static str, value: &str, max: usize) -> String {
        let before = self.errors.len();
        let value = self.required(field, value, max);
        if self.errors.len() == before && !EMAIL_RE.is_match(&value) {
            self.fail(field, "must be a valid email address");
        }
        value
    }

    /// Blank optional values collapse to `None`.
    fn optional(&mut self, field: &'static str, value: Option<&str>, max: usize) -> Option<String> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        if value.chars().count() > max {
            self.fail(field, format!("must be at most {} characters", max));
        }
        Some(value.to_string())
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors: self.errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_payload() -> ClientPayload {
        ClientPayload {
            name: "Acme Co".to_string(),
            contact_email: "buyer@acme.test".to_string(),
            visit_date: "2024-05-01".to_string(),
            sales_rep_id: "11111111-2222-3333-4444-555555555555".to_string(),
            notes: Some("   ".to_string()),
        }
    }

    #[test]
    fn test_client_payload_validates() {
        let input = client_payload().validate().unwrap();
        assert_eq!(input.name, "Acme Co");
        assert_eq!(input.visit_date.to_string(), "2024-05-01 00:00:00");
        assert_eq!(input.sales_rep_id, crate::models::DEFAULT_SALES_REP_ID);
        assert_eq!(input.notes, None);
    }

    #[test]
    fn test_client_payload_collects_every_error() {
        let payload = ClientPayload {
            name: "x".repeat(NAME_MAX_LEN + 1),
            contact_email: "not-an-email".to_string(),
            visit_date: "yesterday".to_string(),
            sales_rep_id: "r1".to_string(),
            notes: None,
        };
        let err = payload.validate().unwrap_err();
        let fields: Vec<_> = err.errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "contactEmail", "visitDate", "salesRepId"]);
    }

    #[test]
    fn test_missing_fields_are_required() {
        let err = ClientPayload::default().validate().unwrap_err();
        assert_eq!(err.errors.len(), 4);
        assert!(err.errors.iter().all(|e| e.message == "is required"));
    }

    #[test]
    fn test_sales_rep_payload_limits() {
        let ok = SalesRepPayload {
            name: " Ana ".to_string(),
            email: "ana@acme.test".to_string(),
            phone: Some("".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.name, "Ana");
        assert_eq!(ok.phone, None);

        let err = SalesRepPayload {
            name: "Ana".to_string(),
            email: "ana@acme.test".to_string(),
            phone: Some("9".repeat(PHONE_MAX_LEN + 1)),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.errors[0].field, "phone");
    }

    #[test]
    fn test_parse_visit_date_formats() {
        assert!(parse_visit_date("2024-05-01T09:30").is_some());
        assert!(parse_visit_date("2024-05-01T09:30:15").is_some());
        assert!(parse_visit_date("2024-05-01T09:30:15.250").is_some());
        assert_eq!(
            parse_visit_date("2024-05-01T09:30:00+02:00").unwrap().to_string(),
            "2024-05-01 07:30:00"
        );
        assert!(parse_visit_date("01/05/2024").is_none());
    }
}
