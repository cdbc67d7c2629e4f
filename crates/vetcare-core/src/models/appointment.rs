//! Appointment models and the status lifecycle.

use serde::{Deserialize, Serialize};

/// Appointment lifecycle status.
///
/// The lifecycle is `Requested → Confirmed → Completed`, with `Cancelled`
/// reachable from `Requested` or `Confirmed`. `Completed` and `Cancelled`
/// are terminal.
///
/// Wire values match what the store holds: `pendiente`, `confirmada`,
/// `completada`, `cancelada`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppointmentStatus {
    /// Requested by the client, no vet assigned yet
    #[serde(rename = "pendiente")]
    Requested,
    /// Accepted by a vet
    #[serde(rename = "confirmada")]
    Confirmed,
    /// Visit took place (terminal)
    #[serde(rename = "completada")]
    Completed,
    /// Called off by either side (terminal)
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl AppointmentStatus {
    /// Wire string stored in the appointments table.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Requested => "pendiente",
            AppointmentStatus::Confirmed => "confirmada",
            AppointmentStatus::Completed => "completada",
            AppointmentStatus::Cancelled => "cancelada",
        }
    }

    /// Parse a wire string; `None` for values this build does not know.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pendiente" => Some(AppointmentStatus::Requested),
            "confirmada" => Some(AppointmentStatus::Confirmed),
            "completada" => Some(AppointmentStatus::Completed),
            "cancelada" => Some(AppointmentStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal states admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status as read back from the store.
///
/// Rows written by other clients may carry a status value this build does
/// not recognize. Such rows still render (as if requested) but every
/// transition on them is refused until the row is corrected externally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StoredStatus {
    Known(AppointmentStatus),
    Unrecognized(String),
}

impl StoredStatus {
    /// Parse a raw status value from storage. Never fails.
    pub fn parse(raw: &str) -> Self {
        match AppointmentStatus::parse(raw) {
            Some(status) => StoredStatus::Known(status),
            None => StoredStatus::Unrecognized(raw.to_string()),
        }
    }

    /// The recognized status, if any.
    pub fn known(&self) -> Option<AppointmentStatus> {
        match self {
            StoredStatus::Known(status) => Some(*status),
            StoredStatus::Unrecognized(_) => None,
        }
    }

    /// Status used for display. Unrecognized values render as requested;
    /// they are never guessed into a transitionable state.
    pub fn display_status(&self) -> AppointmentStatus {
        self.known().unwrap_or(AppointmentStatus::Requested)
    }

    /// The raw wire string.
    pub fn raw(&self) -> &str {
        match self {
            StoredStatus::Known(status) => status.as_str(),
            StoredStatus::Unrecognized(raw) => raw,
        }
    }
}

/// Appointment type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppointmentType {
    /// In-clinic visit
    #[serde(rename = "consulta")]
    InPerson,
    /// Remote consultation over a provisioned session URL
    #[serde(rename = "teleconsulta")]
    Teleconsult,
    /// Home visit
    #[serde(rename = "domicilio")]
    HomeVisit,
}

impl AppointmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentType::InPerson => "consulta",
            AppointmentType::Teleconsult => "teleconsulta",
            AppointmentType::HomeVisit => "domicilio",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "consulta" => Some(AppointmentType::InPerson),
            "teleconsulta" => Some(AppointmentType::Teleconsult),
            "domicilio" => Some(AppointmentType::HomeVisit),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scheduling request linking a pet, a client, and eventually a vet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    /// Unique appointment ID
    pub id: String,
    /// Pet this appointment is for
    pub pet_id: String,
    /// Client who requested it
    pub client_id: String,
    /// Assigned vet - null until accepted
    pub vet_id: Option<String>,
    /// Appointment type
    pub kind: AppointmentType,
    /// Lifecycle status as stored
    pub status: StoredStatus,
    /// Reason for the visit
    pub reason: String,
    /// Scheduled time (RFC 3339) - null means "to be confirmed"
    pub scheduled_for: Option<String>,
    /// Session URL, set at most once for teleconsult appointments
    pub teleconference_url: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Appointment {
    /// Create a new appointment request. Creation is owned by the client
    /// booking flow; this constructor exists for that flow and for tests.
    pub fn new(
        pet_id: String,
        client_id: String,
        kind: AppointmentType,
        reason: String,
        scheduled_for: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pet_id,
            client_id,
            vet_id: None,
            kind,
            status: StoredStatus::Known(AppointmentStatus::Requested),
            reason,
            scheduled_for,
            teleconference_url: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Whether a time has been agreed yet.
    pub fn is_unscheduled(&self) -> bool {
        self.scheduled_for.is_none()
    }

    /// Scheduled time for display, or the "to be confirmed" label.
    pub fn scheduled_display(&self) -> &str {
        self.scheduled_for.as_deref().unwrap_or("to be confirmed")
    }
}

/// A listing row with the joined display fields the schedule view needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentView {
    pub appointment: Appointment,
    pub pet_name: String,
    pub pet_species: String,
    pub client_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_appointment() {
        let appt = Appointment::new(
            "pet-1".into(),
            "client-1".into(),
            AppointmentType::InPerson,
            "annual checkup".into(),
            None,
        );
        assert_eq!(appt.id.len(), 36);
        assert_eq!(appt.status, StoredStatus::Known(AppointmentStatus::Requested));
        assert!(appt.vet_id.is_none());
        assert!(appt.is_unscheduled());
        assert_eq!(appt.scheduled_display(), "to be confirmed");
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            AppointmentStatus::Requested,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ] {
            assert_eq!(AppointmentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AppointmentStatus::parse("archived"), None);
    }

    #[test]
    fn test_unrecognized_status_displays_as_requested() {
        let stored = StoredStatus::parse("archived");
        assert_eq!(stored, StoredStatus::Unrecognized("archived".into()));
        assert_eq!(stored.known(), None);
        assert_eq!(stored.display_status(), AppointmentStatus::Requested);
        assert_eq!(stored.raw(), "archived");
    }

    #[test]
    fn test_terminal_states() {
        assert!(!AppointmentStatus::Requested.is_terminal());
        assert!(!AppointmentStatus::Confirmed.is_terminal());
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_type_round_trip() {
        for kind in [
            AppointmentType::InPerson,
            AppointmentType::Teleconsult,
            AppointmentType::HomeVisit,
        ] {
            assert_eq!(AppointmentType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(AppointmentType::parse("cirugia"), None);
    }
}
