//! Appointment lifecycle state machine.
//!
//! States: `requested → confirmed → completed`, with `cancelled` reachable
//! from `requested` or `confirmed`. No transition leaves a terminal state.
//! Every transition is a conditional write guarded on the current status;
//! a guard miss is re-read and reported, never overwritten.

use crate::db::{Database, GuardedWrite};
use crate::error::{ClinicError, ClinicResult};
use crate::events::{EventBus, QueryTag};
use crate::models::{Appointment, AppointmentStatus, AppointmentView, StoredStatus};

/// Owns state transitions for appointments.
pub struct AppointmentManager<'a> {
    db: &'a Database,
    events: &'a EventBus,
}

impl<'a> AppointmentManager<'a> {
    pub fn new(db: &'a Database, events: &'a EventBus) -> Self {
        Self { db, events }
    }

    /// List appointments still open for the vet (requested or confirmed),
    /// ascending by scheduled time, unscheduled last. Pure read.
    pub fn list_open(&self, since: Option<&str>) -> ClinicResult<Vec<AppointmentView>> {
        Ok(self.db.list_open_appointments(since)?)
    }

    /// Accept a requested appointment, assigning the acting vet.
    pub fn accept(&self, appointment_id: &str, vet_id: &str) -> ClinicResult<Appointment> {
        self.transition(
            appointment_id,
            &[AppointmentStatus::Requested],
            AppointmentStatus::Confirmed,
            Some(vet_id),
        )
    }

    /// Cancel a requested or confirmed appointment. Cancelling twice fails
    /// with an invalid-transition error so stale UIs see the race.
    pub fn cancel(&self, appointment_id: &str) -> ClinicResult<Appointment> {
        self.transition(
            appointment_id,
            &[AppointmentStatus::Requested, AppointmentStatus::Confirmed],
            AppointmentStatus::Cancelled,
            None,
        )
    }

    /// Complete a confirmed appointment. The caller is expected to offer
    /// creating a clinical entry afterwards; that is a workflow suggestion,
    /// not something enforced here.
    pub fn complete(&self, appointment_id: &str) -> ClinicResult<Appointment> {
        self.transition(
            appointment_id,
            &[AppointmentStatus::Confirmed],
            AppointmentStatus::Completed,
            None,
        )
    }

    // TODO: add schedule(appointment_id, time) once the two-phase booking
    // flow decides how an unscheduled appointment gets its time.

    fn transition(
        &self,
        appointment_id: &str,
        allowed_from: &[AppointmentStatus],
        to: AppointmentStatus,
        vet_id: Option<&str>,
    ) -> ClinicResult<Appointment> {
        let appointment = self.load(appointment_id)?;
        let current = self.recognized_status(&appointment)?;
        if !allowed_from.contains(&current) {
            return Err(ClinicError::InvalidTransition {
                id: appointment_id.to_string(),
                from: current,
                to,
            });
        }

        match self
            .db
            .set_appointment_status(appointment_id, allowed_from, to, vet_id)?
        {
            GuardedWrite::Applied => {
                self.events.publish(QueryTag::VetAppointments);
                self.load(appointment_id)
            }
            GuardedWrite::PreconditionFailed => {
                // A concurrent writer moved the row between our read and the
                // guarded write; report what it is now.
                let fresh = self.load(appointment_id)?;
                let from = self.recognized_status(&fresh)?;
                Err(ClinicError::InvalidTransition {
                    id: appointment_id.to_string(),
                    from,
                    to,
                })
            }
            GuardedWrite::NotFound => Err(self.not_found(appointment_id)),
        }
    }

    fn load(&self, appointment_id: &str) -> ClinicResult<Appointment> {
        self.db
            .get_appointment(appointment_id)?
            .ok_or_else(|| self.not_found(appointment_id))
    }

    /// An unrecognized stored status blocks every transition until the row
    /// is corrected externally.
    fn recognized_status(&self, appointment: &Appointment) -> ClinicResult<AppointmentStatus> {
        match &appointment.status {
            StoredStatus::Known(status) => Ok(*status),
            StoredStatus::Unrecognized(raw) => Err(ClinicError::InvalidState {
                reason: format!(
                    "appointment {} has unrecognized status '{}'",
                    appointment.id, raw
                ),
            }),
        }
    }

    fn not_found(&self, appointment_id: &str) -> ClinicError {
        ClinicError::NotFound {
            entity: "appointment",
            id: appointment_id.to_string(),
        }
    }
}
