use chrono::{Duration, TimeZone, Utc};
use medtrack_core::{
    Medication, MedicationDraft, MedicationRepository, MedicationService, MemoryStore,
    RefillUrgency, ServiceError, SupplyLevel,
};

#[test]
fn save_new_draft_assigns_timestamp_id_and_persists() {
    let service = service();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
    let mut draft = draft("Lisinopril", "10mg", "Once daily", now);
    draft.refill_at = Some(now + Duration::days(30));
    draft.prescriber = Some("Smith".to_string());
    draft.instructions = Some(String::new());
    draft.pills_remaining = Some(30);
    draft.total_pills = Some(30);

    let id = service.save_at(None, draft, now).unwrap();

    assert_eq!(id, now.timestamp_millis().to_string());
    let stored = service.get(&id).expect("saved medication should be stored");
    assert_eq!(stored.name, "Lisinopril");
    assert_eq!(stored.prescribed_date, "2024-06-01T10:00:00.000Z");
    assert_eq!(stored.refill_date.as_deref(), Some("2024-07-01T10:00:00.000Z"));
    assert_eq!(stored.prescriber.as_deref(), Some("Smith"));
    assert_eq!(stored.instructions, None);
}

#[test]
fn save_generates_unique_ids_within_the_same_millisecond() {
    let service = service();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();

    let first = service.save_at(None, draft("A", "1mg", "daily", now), now).unwrap();
    let second = service.save_at(None, draft("B", "2mg", "daily", now), now).unwrap();

    assert_ne!(first, second);
    assert_eq!(service.repository().get_all().len(), 2);
}

#[test]
fn save_with_existing_id_updates_instead_of_appending() {
    let service = service();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
    let id = service
        .save_at(None, draft("Metformin", "500mg", "daily", now), now)
        .unwrap();

    let mut edited = service.load_draft(&id, now).expect("draft for edit");
    edited.dosage = "1000mg".to_string();
    let saved_id = service.save_at(Some(&id), edited, now).unwrap();

    assert_eq!(saved_id, id);
    let all = service.repository().get_all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].dosage, "1000mg");
}

#[test]
fn blank_existing_id_is_treated_as_create() {
    let service = service();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();

    let id = service
        .save_at(Some("  "), draft("Aspirin", "81mg", "daily", now), now)
        .unwrap();

    assert!(!id.trim().is_empty());
    assert_eq!(service.repository().get_all().len(), 1);
}

#[test]
fn save_rejects_missing_required_fields_without_writing() {
    let service = service();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();

    let err = service
        .save_at(None, draft("Aspirin", " ", "", now), now)
        .unwrap_err();

    assert_eq!(
        err,
        ServiceError::MissingRequiredFields(vec!["dosage", "frequency"])
    );
    assert_eq!(err.to_string(), "missing required fields: dosage, frequency");
    assert!(service.repository().get_all().is_empty());
}

#[test]
fn load_draft_for_unknown_id_is_none() {
    let service = service();
    assert!(service.load_draft("missing", Utc::now()).is_none());
}

#[test]
fn list_projects_records_in_stored_order() {
    let service = service();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let mut soon = Medication::new("1", "Amoxicillin", "500mg", "3x daily", now);
    soon.refill_date = Some("2024-06-03T12:00:00.000Z".to_string());
    soon.pills_remaining = Some(3);
    soon.total_pills = Some(21);
    let mut later = Medication::new("2", "Levothyroxine", "50mcg", "daily", now);
    later.refill_date = Some("2024-07-01T00:00:00.000Z".to_string());
    service.repository().save_all(&[soon, later]);

    let rows = service.list(now);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Amoxicillin");
    let badge = rows[0].refill.as_ref().unwrap();
    assert_eq!((badge.days, badge.urgency), (3, RefillUrgency::Soon));
    assert_eq!(rows[0].supply.as_ref().unwrap().supply.level, SupplyLevel::Critical);
    let badge = rows[1].refill.as_ref().unwrap();
    assert_eq!((badge.days, badge.urgency), (30, RefillUrgency::Scheduled));
    assert!(rows[1].supply.is_none());
}

#[test]
fn delete_removes_record_from_list() {
    let service = service();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
    let id = service
        .save_at(None, draft("Aspirin", "81mg", "daily", now), now)
        .unwrap();

    service.delete(&id);

    assert!(service.list(now).is_empty());
}

fn service() -> MedicationService<MemoryStore> {
    MedicationService::new(MedicationRepository::new(MemoryStore::new()))
}

fn draft(
    name: &str,
    dosage: &str,
    frequency: &str,
    now: chrono::DateTime<Utc>,
) -> MedicationDraft {
    MedicationDraft {
        name: name.to_string(),
        dosage: dosage.to_string(),
        frequency: frequency.to_string(),
        ..MedicationDraft::empty(now)
    }
}
