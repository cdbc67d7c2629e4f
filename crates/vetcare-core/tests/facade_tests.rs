//! Tests for the FFI facade exposed to the UI shell.

use vetcare_core::models::{AppointmentType, ClinicalRecord, PaymentStatus, Sale, SaleItem};
use vetcare_core::{
    open_database_in_memory, Appointment, FfiEntryForm, QueryTag, VetCareCore, VetCareError,
};
use std::sync::Arc;

fn seed_core() -> Arc<VetCareCore> {
    let core = open_database_in_memory().unwrap();
    core.with_db(|db| {
        db.insert_profile("client-1", "Ana García")?;
        db.insert_profile("vet-1", "Dr. Ruiz")?;
        db.insert_pet("pet-1", "client-1", "Max", "canine")?;
        Ok(())
    })
    .unwrap();
    core
}

fn seed_appointment(core: &VetCareCore, kind: AppointmentType) -> Appointment {
    let appt = Appointment::new(
        "pet-1".to_string(),
        "client-1".to_string(),
        kind,
        "annual checkup".to_string(),
        Some("2024-06-10T09:00:00Z".to_string()),
    );
    core.with_db(|db| db.insert_appointment(&appt)).unwrap();
    appt
}

#[test]
fn test_accept_requires_session() {
    let core = seed_core();
    let appt = seed_appointment(&core, AppointmentType::InPerson);

    let err = core.accept_appointment(appt.id.clone()).unwrap_err();
    assert!(matches!(err, VetCareError::InvalidState(_)));

    core.sign_in("vet-1".to_string()).unwrap();
    let accepted = core.accept_appointment(appt.id).unwrap();
    assert_eq!(accepted.vet_id, Some("vet-1".to_string()));
    assert_eq!(accepted.display_status, "confirmada");
}

#[test]
fn test_session_lifecycle() {
    let core = seed_core();
    assert_eq!(core.current_user_id().unwrap(), None);

    core.sign_in("vet-1".to_string()).unwrap();
    assert_eq!(core.current_user_id().unwrap(), Some("vet-1".to_string()));

    core.sign_out().unwrap();
    assert_eq!(core.current_user_id().unwrap(), None);
}

#[test]
fn test_mutations_accumulate_invalidations() {
    let core = seed_core();
    core.sign_in("vet-1".to_string()).unwrap();
    let appt = seed_appointment(&core, AppointmentType::Teleconsult);

    core.accept_appointment(appt.id.clone()).unwrap();
    core.ensure_teleconference_link(appt.id).unwrap();

    let tags = core.drain_invalidations().unwrap();
    assert_eq!(
        tags,
        vec![QueryTag::VetAppointments, QueryTag::VetAppointments]
    );
    // Draining clears the queue
    assert!(core.drain_invalidations().unwrap().is_empty());
}

#[test]
fn test_clinical_entry_authored_by_session_vet() {
    let core = seed_core();
    core.sign_in("vet-1".to_string()).unwrap();

    let record = ClinicalRecord::new("pet-1".to_string());
    core.with_db(|db| db.insert_record(&record)).unwrap();

    let form = FfiEntryForm {
        reason: "itchy skin".to_string(),
        diagnosis: "dermatitis".to_string(),
        treatment: String::new(),
        prescriptions: String::new(),
        weight: "12.5".to_string(),
        temperature: String::new(),
        next_appointment: String::new(),
    };
    let entry = core.append_clinical_entry(record.id.clone(), form).unwrap();
    assert_eq!(entry.vet_id, "vet-1");
    assert_eq!(entry.weight, Some(12.5));

    let records = core.list_clinical_records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].pet_name, "Max");
    assert_eq!(records[0].entries.len(), 1);

    assert_eq!(
        core.drain_invalidations().unwrap(),
        vec![QueryTag::ClinicalRecords]
    );
}

#[test]
fn test_purchase_views_and_json_export() {
    let core = seed_core();
    core.with_db(|db| {
        db.insert_product("prod-1", "SH-001", "Flea shampoo")?;
        let sale_id = "sale-1".to_string();
        let sale = Sale {
            id: sale_id.clone(),
            customer_id: "client-1".to_string(),
            total: 30.0,
            payment_status: PaymentStatus::Paid,
            created_at: chrono::Utc::now().to_rfc3339(),
            items: vec![SaleItem {
                id: "item-1".to_string(),
                sale_id,
                product_id: "prod-1".to_string(),
                product_name: String::new(),
                product_sku: String::new(),
                quantity: 3,
                unit_price: 10.0,
                subtotal: 30.0,
            }],
        };
        db.insert_sale(&sale)
    })
    .unwrap();

    let purchases = core.list_purchases("client-1".to_string()).unwrap();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].unit_count, 3);
    assert_eq!(purchases[0].short_id, "sale-1");
    assert_eq!(purchases[0].items[0].product_name, "Flea shampoo");

    let json = core.export_purchases_json("client-1".to_string()).unwrap();
    assert!(json.contains("\"sale-1\""));
    assert!(json.contains("\"paid\""));

    let message = core.download_invoice_pdf("sale-1".to_string()).unwrap();
    assert!(message.contains("not yet available"));
}

#[test]
fn test_pdf_placeholders_verify_existence() {
    let core = seed_core();

    let err = core.download_record_pdf("missing".to_string()).unwrap_err();
    assert!(matches!(err, VetCareError::NotFound(_)));

    let err = core.download_invoice_pdf("missing".to_string()).unwrap_err();
    assert!(matches!(err, VetCareError::NotFound(_)));
}
