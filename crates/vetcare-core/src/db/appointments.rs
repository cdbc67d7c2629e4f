//! Appointment database operations.
//!
//! All status and URL writes are conditioned on the current field value, so
//! a transition whose precondition no longer holds at write time fails
//! explicitly instead of overwriting a concurrent writer.

use rusqlite::{params, OptionalExtension, ToSql};

use super::{Database, DbError, DbResult, GuardedWrite};
use crate::models::{
    Appointment, AppointmentStatus, AppointmentType, AppointmentView, StoredStatus,
};

const APPOINTMENT_COLUMNS: &str = "id, pet_id, client_id, vet_id, type, status, reason, \
     scheduled_for, teleconference_url, created_at, updated_at";

impl Database {
    /// Insert a new appointment. Creation belongs to the client booking
    /// flow; the adapter carries it for that flow and for tests.
    pub fn insert_appointment(&self, appointment: &Appointment) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO appointments (
                id, pet_id, client_id, vet_id, type, status, reason,
                scheduled_for, teleconference_url, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                appointment.id,
                appointment.pet_id,
                appointment.client_id,
                appointment.vet_id,
                appointment.kind.as_str(),
                appointment.status.raw(),
                appointment.reason,
                appointment.scheduled_for,
                appointment.teleconference_url,
                appointment.created_at,
                appointment.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get an appointment by ID.
    pub fn get_appointment(&self, id: &str) -> DbResult<Option<Appointment>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM appointments WHERE id = ?",
                    APPOINTMENT_COLUMNS
                ),
                [id],
                appointment_row,
            )
            .optional()?
            .map(Appointment::try_from)
            .transpose()
    }

    /// List appointments still open for the vet (requested or confirmed),
    /// with the joined display fields, ascending by scheduled time.
    /// Unscheduled appointments sort last. The optional earliest-date filter
    /// compares against the scheduled time, so it excludes unscheduled rows,
    /// matching the original listing query.
    ///
    /// The filter excludes the terminal statuses rather than whitelisting
    /// the open ones: rows with a status this build does not recognize must
    /// still be listed (they display as requested).
    pub fn list_open_appointments(&self, since: Option<&str>) -> DbResult<Vec<AppointmentView>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT a.id, a.pet_id, a.client_id, a.vet_id, a.type, a.status, a.reason,
                   a.scheduled_for, a.teleconference_url, a.created_at, a.updated_at,
                   p.name, p.species, pr.full_name
            FROM appointments a
            JOIN pets p ON p.id = a.pet_id
            JOIN profiles pr ON pr.id = a.client_id
            WHERE a.status NOT IN ('completada', 'cancelada')
              AND (?1 IS NULL OR a.scheduled_for >= ?1)
            ORDER BY (a.scheduled_for IS NULL), a.scheduled_for ASC
            "#,
        )?;

        let rows = stmt.query_map(params![since], |row| {
            let inner = appointment_row(row)?;
            Ok((
                inner,
                row.get::<_, String>(11)?,
                row.get::<_, String>(12)?,
                row.get::<_, String>(13)?,
            ))
        })?;

        let mut views = Vec::new();
        for row in rows {
            let (inner, pet_name, pet_species, client_name) = row?;
            views.push(AppointmentView {
                appointment: inner.try_into()?,
                pet_name,
                pet_species,
                client_name,
            });
        }
        Ok(views)
    }

    /// Move an appointment to `next`, guarded on the status still being one
    /// of `expected`. When `vet_id` is given it is assigned as part of the
    /// same write (the accept path); otherwise the existing value is kept.
    pub fn set_appointment_status(
        &self,
        id: &str,
        expected: &[AppointmentStatus],
        next: AppointmentStatus,
        vet_id: Option<&str>,
    ) -> DbResult<GuardedWrite> {
        let placeholders = vec!["?"; expected.len()].join(", ");
        let sql = format!(
            "UPDATE appointments \
             SET status = ?, vet_id = COALESCE(?, vet_id), updated_at = datetime('now') \
             WHERE id = ? AND status IN ({})",
            placeholders
        );

        let next_str = next.as_str();
        let mut sql_params: Vec<&dyn ToSql> = vec![&next_str, &vet_id, &id];
        let expected_strs: Vec<&str> = expected.iter().map(|s| s.as_str()).collect();
        for value in &expected_strs {
            sql_params.push(value);
        }

        let rows_affected = self.conn.execute(&sql, sql_params.as_slice())?;
        if rows_affected > 0 {
            return Ok(GuardedWrite::Applied);
        }
        self.guarded_miss(id)
    }

    /// Persist a teleconference URL, guarded on the field still being NULL.
    /// Guarantees at most one URL per appointment even under concurrent
    /// provisioning.
    pub fn claim_teleconference_url(&self, id: &str, url: &str) -> DbResult<GuardedWrite> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE appointments
            SET teleconference_url = ?2, updated_at = datetime('now')
            WHERE id = ?1 AND teleconference_url IS NULL
            "#,
            params![id, url],
        )?;
        if rows_affected > 0 {
            return Ok(GuardedWrite::Applied);
        }
        self.guarded_miss(id)
    }

    /// A guard that matched no rows: either the row is gone or the guard
    /// field changed under us.
    fn guarded_miss(&self, id: &str) -> DbResult<GuardedWrite> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM appointments WHERE id = ?)",
            [id],
            |row| row.get(0),
        )?;
        if exists {
            Ok(GuardedWrite::PreconditionFailed)
        } else {
            Ok(GuardedWrite::NotFound)
        }
    }
}

/// Intermediate row struct for database mapping.
struct AppointmentRow {
    id: String,
    pet_id: String,
    client_id: String,
    vet_id: Option<String>,
    kind: String,
    status: String,
    reason: String,
    scheduled_for: Option<String>,
    teleconference_url: Option<String>,
    created_at: String,
    updated_at: String,
}

fn appointment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        pet_id: row.get(1)?,
        client_id: row.get(2)?,
        vet_id: row.get(3)?,
        kind: row.get(4)?,
        status: row.get(5)?,
        reason: row.get(6)?,
        scheduled_for: row.get(7)?,
        teleconference_url: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = DbError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let kind = AppointmentType::parse(&row.kind)
            .ok_or_else(|| DbError::Constraint(format!("Unknown appointment type: {}", row.kind)))?;

        Ok(Appointment {
            id: row.id,
            pet_id: row.pet_id,
            client_id: row.client_id,
            vet_id: row.vet_id,
            kind,
            status: StoredStatus::parse(&row.status),
            reason: row.reason,
            scheduled_for: row.scheduled_for,
            teleconference_url: row.teleconference_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_profile("client-1", "Ana García").unwrap();
        db.insert_pet("pet-1", "client-1", "Max", "canine").unwrap();
        db
    }

    fn make_appointment(scheduled_for: Option<&str>) -> Appointment {
        Appointment::new(
            "pet-1".into(),
            "client-1".into(),
            AppointmentType::InPerson,
            "annual checkup".into(),
            scheduled_for.map(String::from),
        )
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();
        let appt = make_appointment(Some("2024-06-10T09:00:00Z"));
        db.insert_appointment(&appt).unwrap();

        let retrieved = db.get_appointment(&appt.id).unwrap().unwrap();
        assert_eq!(retrieved, appt);
    }

    #[test]
    fn test_list_sorts_unscheduled_last() {
        let db = setup_db();

        let unscheduled = make_appointment(None);
        let early = make_appointment(Some("2024-06-01T09:00:00Z"));
        let late = make_appointment(Some("2024-06-20T09:00:00Z"));
        db.insert_appointment(&unscheduled).unwrap();
        db.insert_appointment(&late).unwrap();
        db.insert_appointment(&early).unwrap();

        let listed = db.list_open_appointments(None).unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].appointment.id, early.id);
        assert_eq!(listed[1].appointment.id, late.id);
        assert_eq!(listed[2].appointment.id, unscheduled.id);
        assert_eq!(listed[0].pet_name, "Max");
        assert_eq!(listed[0].client_name, "Ana García");
    }

    #[test]
    fn test_list_date_filter_excludes_unscheduled() {
        let db = setup_db();

        let unscheduled = make_appointment(None);
        let early = make_appointment(Some("2024-06-01T09:00:00Z"));
        let late = make_appointment(Some("2024-06-20T09:00:00Z"));
        db.insert_appointment(&unscheduled).unwrap();
        db.insert_appointment(&early).unwrap();
        db.insert_appointment(&late).unwrap();

        let listed = db.list_open_appointments(Some("2024-06-10")).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].appointment.id, late.id);
    }

    #[test]
    fn test_list_excludes_closed_statuses() {
        let db = setup_db();

        let open = make_appointment(None);
        db.insert_appointment(&open).unwrap();

        let mut done = make_appointment(None);
        done.status = StoredStatus::Known(AppointmentStatus::Completed);
        db.insert_appointment(&done).unwrap();

        let listed = db.list_open_appointments(None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].appointment.id, open.id);
    }

    #[test]
    fn test_list_includes_unrecognized_status() {
        let db = setup_db();

        let mut odd = make_appointment(None);
        odd.status = StoredStatus::Unrecognized("archived".into());
        db.insert_appointment(&odd).unwrap();

        let listed = db.list_open_appointments(None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(
            listed[0].appointment.status.display_status(),
            AppointmentStatus::Requested
        );
    }

    #[test]
    fn test_guarded_status_write() {
        let db = setup_db();
        let appt = make_appointment(None);
        db.insert_appointment(&appt).unwrap();

        let outcome = db
            .set_appointment_status(
                &appt.id,
                &[AppointmentStatus::Requested],
                AppointmentStatus::Confirmed,
                Some("vet-1"),
            )
            .unwrap();
        assert_eq!(outcome, GuardedWrite::Applied);

        let updated = db.get_appointment(&appt.id).unwrap().unwrap();
        assert_eq!(
            updated.status,
            StoredStatus::Known(AppointmentStatus::Confirmed)
        );
        assert_eq!(updated.vet_id, Some("vet-1".into()));

        // Guard no longer holds
        let outcome = db
            .set_appointment_status(
                &appt.id,
                &[AppointmentStatus::Requested],
                AppointmentStatus::Confirmed,
                Some("vet-2"),
            )
            .unwrap();
        assert_eq!(outcome, GuardedWrite::PreconditionFailed);

        // vet_id untouched by the failed write
        let unchanged = db.get_appointment(&appt.id).unwrap().unwrap();
        assert_eq!(unchanged.vet_id, Some("vet-1".into()));
    }

    #[test]
    fn test_guarded_write_missing_row() {
        let db = setup_db();
        let outcome = db
            .set_appointment_status(
                "missing",
                &[AppointmentStatus::Requested],
                AppointmentStatus::Confirmed,
                None,
            )
            .unwrap();
        assert_eq!(outcome, GuardedWrite::NotFound);
    }

    #[test]
    fn test_claim_url_only_once() {
        let db = setup_db();
        let appt = make_appointment(None);
        db.insert_appointment(&appt).unwrap();

        let first = db
            .claim_teleconference_url(&appt.id, "https://meet.example/a")
            .unwrap();
        assert_eq!(first, GuardedWrite::Applied);

        let second = db
            .claim_teleconference_url(&appt.id, "https://meet.example/b")
            .unwrap();
        assert_eq!(second, GuardedWrite::PreconditionFailed);

        let stored = db.get_appointment(&appt.id).unwrap().unwrap();
        assert_eq!(
            stored.teleconference_url,
            Some("https://meet.example/a".into())
        );
    }

    #[test]
    fn test_unknown_status_survives_round_trip() {
        let db = setup_db();
        let mut appt = make_appointment(None);
        appt.status = StoredStatus::Unrecognized("archived".into());
        db.insert_appointment(&appt).unwrap();

        let retrieved = db.get_appointment(&appt.id).unwrap().unwrap();
        assert_eq!(
            retrieved.status,
            StoredStatus::Unrecognized("archived".into())
        );
    }
}
