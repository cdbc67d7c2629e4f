//! Clinical record and entry models.

use serde::{Deserialize, Serialize};

use crate::error::{ClinicError, ClinicResult};

/// The durable per-patient container for clinical history.
///
/// One record per pet. A record must exist before any entry can be
/// appended to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicalRecord {
    /// Unique record ID
    pub id: String,
    /// Owning pet
    pub pet_id: String,
    /// Creation timestamp
    pub created_at: String,
}

impl ClinicalRecord {
    pub fn new(pet_id: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pet_id,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// One immutable visit entry appended to a clinical record.
///
/// Entries are never edited or removed; a mistaken entry is corrected by
/// appending a compensating one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicalEntry {
    /// Unique entry ID
    pub id: String,
    /// Parent record
    pub record_id: String,
    /// Authoring vet
    pub vet_id: String,
    /// Visit reason (required)
    pub reason: String,
    /// Diagnosis text
    pub diagnosis: Option<String>,
    /// Treatment text
    pub treatment: Option<String>,
    /// Prescriptions text
    pub prescriptions: Option<String>,
    /// Weight in kg
    pub weight: Option<f64>,
    /// Temperature in °C
    pub temperature: Option<f64>,
    /// Suggested next appointment date (YYYY-MM-DD)
    pub next_appointment: Option<String>,
    /// Visit timestamp, assigned at append time
    pub visit_date: String,
    /// Row creation timestamp
    pub created_at: String,
}

impl ClinicalEntry {
    /// Build an entry from validated form input. The visit timestamp is
    /// assigned here, at append time.
    pub fn new(record_id: String, vet_id: String, fields: ValidatedEntry) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            record_id,
            vet_id,
            reason: fields.reason,
            diagnosis: fields.diagnosis,
            treatment: fields.treatment,
            prescriptions: fields.prescriptions,
            weight: fields.weight,
            temperature: fields.temperature,
            next_appointment: fields.next_appointment,
            visit_date: now.clone(),
            created_at: now,
        }
    }
}

/// Raw entry form input, as it arrives from the UI shell.
///
/// All fields are loose strings; empty means absent. Nothing is persisted
/// from this shape directly - `validate` must produce a [`ValidatedEntry`]
/// first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryForm {
    pub reason: String,
    pub diagnosis: String,
    pub treatment: String,
    pub prescriptions: String,
    pub weight: String,
    pub temperature: String,
    pub next_appointment: String,
}

/// Form input that has passed validation and is ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEntry {
    pub reason: String,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub prescriptions: Option<String>,
    pub weight: Option<f64>,
    pub temperature: Option<f64>,
    pub next_appointment: Option<String>,
}

impl EntryForm {
    /// Validate the form, rejecting on the first invalid field.
    ///
    /// The reason is required. Numeric fields must parse as finite decimals
    /// when present; invalid text is rejected, never coerced to zero. Empty
    /// optional fields become `None`.
    pub fn validate(&self) -> ClinicResult<ValidatedEntry> {
        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err(ClinicError::Validation {
                field: "reason",
                reason: "visit reason is required".into(),
            });
        }

        let weight = parse_decimal(&self.weight, "weight")?;
        let temperature = parse_decimal(&self.temperature, "temperature")?;
        let next_appointment = parse_date(&self.next_appointment, "next_appointment")?;

        Ok(ValidatedEntry {
            reason: reason.to_string(),
            diagnosis: optional_text(&self.diagnosis),
            treatment: optional_text(&self.treatment),
            prescriptions: optional_text(&self.prescriptions),
            weight,
            temperature,
            next_appointment,
        })
    }
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_decimal(value: &str, field: &'static str) -> ClinicResult<Option<f64>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let parsed: f64 = trimmed.parse().map_err(|_| ClinicError::Validation {
        field,
        reason: format!("'{}' is not a number", trimmed),
    })?;
    if !parsed.is_finite() {
        return Err(ClinicError::Validation {
            field,
            reason: format!("'{}' is not a finite number", trimmed),
        });
    }
    Ok(Some(parsed))
}

fn parse_date(value: &str, field: &'static str) -> ClinicResult<Option<String>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        ClinicError::Validation {
            field,
            reason: format!("'{}' is not a YYYY-MM-DD date", trimmed),
        }
    })?;
    Ok(Some(trimmed.to_string()))
}

/// A record listing row with the joined pet/owner identity and its entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordView {
    pub record: ClinicalRecord,
    pub pet_name: String,
    pub pet_species: String,
    pub owner_name: String,
    pub entries: Vec<ClinicalEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with_reason() -> EntryForm {
        EntryForm {
            reason: "limping on front left leg".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_reason_rejected() {
        let form = EntryForm {
            reason: "   ".into(),
            ..Default::default()
        };
        let err = form.validate().unwrap_err();
        assert!(matches!(err, ClinicError::Validation { field: "reason", .. }));
    }

    #[test]
    fn test_numeric_fields_parse() {
        let mut form = form_with_reason();
        form.weight = "12.5".into();
        form.temperature = "38.6".into();

        let validated = form.validate().unwrap();
        assert_eq!(validated.weight, Some(12.5));
        assert_eq!(validated.temperature, Some(38.6));
    }

    #[test]
    fn test_invalid_weight_names_field() {
        let mut form = form_with_reason();
        form.weight = "abc".into();

        let err = form.validate().unwrap_err();
        match err {
            ClinicError::Validation { field, .. } => assert_eq!(field, "weight"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_temperature_rejected() {
        let mut form = form_with_reason();
        form.temperature = "inf".into();

        let err = form.validate().unwrap_err();
        assert!(matches!(
            err,
            ClinicError::Validation { field: "temperature", .. }
        ));
    }

    #[test]
    fn test_empty_optionals_become_none() {
        let validated = form_with_reason().validate().unwrap();
        assert_eq!(validated.diagnosis, None);
        assert_eq!(validated.weight, None);
        assert_eq!(validated.next_appointment, None);
    }

    #[test]
    fn test_bad_date_rejected() {
        let mut form = form_with_reason();
        form.next_appointment = "next tuesday".into();

        let err = form.validate().unwrap_err();
        assert!(matches!(
            err,
            ClinicError::Validation { field: "next_appointment", .. }
        ));
    }

    #[test]
    fn test_entry_assigns_visit_date() {
        let validated = form_with_reason().validate().unwrap();
        let entry = ClinicalEntry::new("record-1".into(), "vet-1".into(), validated);
        assert_eq!(entry.id.len(), 36);
        assert!(!entry.visit_date.is_empty());
        assert_eq!(entry.reason, "limping on front left leg");
    }
}
