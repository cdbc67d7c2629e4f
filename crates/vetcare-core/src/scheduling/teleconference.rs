//! Teleconference link provisioning for remote consultations.
//!
//! The URL is a pure function of the appointment id; persistence is a
//! separate NULL-guarded write, so two concurrent provisioners can never
//! leave two distinct URLs on one appointment.

use crate::db::{Database, DbError, GuardedWrite};
use crate::error::{ClinicError, ClinicResult};
use crate::events::{EventBus, QueryTag};
use crate::models::{AppointmentStatus, AppointmentType, StoredStatus};

/// Base path the session URLs hang off.
pub const TELECONFERENCE_BASE_URL: &str = "https://meet.vetcare360.app";

/// Deterministically derive the session URL for an appointment.
pub fn teleconference_url(appointment_id: &str) -> String {
    format!("{}/{}", TELECONFERENCE_BASE_URL, appointment_id)
}

/// Lazily provisions session URLs for confirmed teleconsult appointments.
pub struct TeleconferenceProvisioner<'a> {
    db: &'a Database,
    events: &'a EventBus,
}

impl<'a> TeleconferenceProvisioner<'a> {
    pub fn new(db: &'a Database, events: &'a EventBus) -> Self {
        Self { db, events }
    }

    /// Return the appointment's session URL, provisioning it on first use.
    ///
    /// A URL that already exists is returned unchanged with no write and no
    /// event. Fails with an invalid-state error if the appointment is not a
    /// confirmed teleconsult.
    pub fn ensure_link(&self, appointment_id: &str) -> ClinicResult<String> {
        let appointment = self
            .db
            .get_appointment(appointment_id)?
            .ok_or_else(|| ClinicError::NotFound {
                entity: "appointment",
                id: appointment_id.to_string(),
            })?;

        if appointment.kind != AppointmentType::Teleconsult {
            return Err(ClinicError::InvalidState {
                reason: format!(
                    "appointment {} is '{}', not a teleconsult",
                    appointment.id, appointment.kind
                ),
            });
        }
        if appointment.status != StoredStatus::Known(AppointmentStatus::Confirmed) {
            return Err(ClinicError::InvalidState {
                reason: format!(
                    "appointment {} is '{}', links are provisioned only once confirmed",
                    appointment.id,
                    appointment.status.raw()
                ),
            });
        }

        if let Some(url) = appointment.teleconference_url {
            return Ok(url);
        }

        let url = teleconference_url(appointment_id);
        match self.db.claim_teleconference_url(appointment_id, &url)? {
            GuardedWrite::Applied => {
                self.events.publish(QueryTag::VetAppointments);
                Ok(url)
            }
            GuardedWrite::PreconditionFailed => {
                // A concurrent provisioner won the claim; return its URL.
                let fresh = self
                    .db
                    .get_appointment(appointment_id)?
                    .ok_or_else(|| ClinicError::NotFound {
                        entity: "appointment",
                        id: appointment_id.to_string(),
                    })?;
                fresh.teleconference_url.ok_or_else(|| {
                    ClinicError::Store(DbError::Constraint(format!(
                        "appointment {} lost the URL claim but holds no URL",
                        appointment_id
                    )))
                })
            }
            GuardedWrite::NotFound => Err(ClinicError::NotFound {
                entity: "appointment",
                id: appointment_id.to_string(),
            }),
        }
    }
}
