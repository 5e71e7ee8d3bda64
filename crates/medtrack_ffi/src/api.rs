//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose medication list/form use-cases to Dart via FRB.
//! - Translate core types into flat, Dart-friendly shapes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Dates cross the boundary as UTC epoch milliseconds.
//! - All calls share one process-wide service so writes are serialized.

use chrono::{DateTime, Utc};
use log::error;
use medtrack_core::{
    core_version as core_version_inner, db_path_from_env, init_logging as init_logging_inner,
    parse_pill_count, ping as ping_inner, MedicationDraft, MedicationRepository,
    MedicationService, MedicationSummary, RefillUrgency, SqliteStore, SupplyLevel,
};
use once_cell::sync::OnceCell;
use std::path::PathBuf;

static DB_PATH: OnceCell<PathBuf> = OnceCell::new();
static SERVICE: OnceCell<MedicationService<SqliteStore>> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One medication row for the list screen.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationListItem {
    pub id: String,
    pub name: String,
    /// `"{dosage} • {frequency}"`.
    pub subtitle: String,
    /// Whole days until refill; negative when overdue.
    pub refill_days: Option<i64>,
    /// e.g. `"5d"`.
    pub refill_label: Option<String>,
    /// Refill is due within a week (highlight color).
    pub refill_soon: bool,
    pub prescriber_label: Option<String>,
    /// 0..=100 (may exceed 100 when over-counted).
    pub supply_percentage: Option<f64>,
    /// `critical|low|healthy`.
    pub supply_level: Option<String>,
    pub supply_label: Option<String>,
    pub instructions: Option<String>,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationListResponse {
    pub items: Vec<MedicationListItem>,
    pub message: String,
}

/// Create/edit form values.
///
/// Pill counts are raw text as typed; they are parsed leniently on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationForm {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub prescribed_epoch_ms: i64,
    pub refill_epoch_ms: Option<i64>,
    pub instructions: String,
    pub prescriber: String,
    pub pills_remaining: String,
    pub total_pills: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationActionResponse {
    pub ok: bool,
    /// Saved or deleted medication ID.
    pub medication_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl MedicationActionResponse {
    fn success(message: impl Into<String>, medication_id: String) -> Self {
        Self {
            ok: true,
            medication_id: Some(medication_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            medication_id: None,
            message: message.into(),
        }
    }
}

/// Lists all medications in stored order, projected for display.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; storage failures yield an empty list.
#[flutter_rust_bridge::frb(sync)]
pub fn medication_list() -> MedicationListResponse {
    let service = match service() {
        Ok(service) => service,
        Err(err) => {
            return MedicationListResponse {
                items: Vec::new(),
                message: format!("medication_list failed: {err}"),
            }
        }
    };

    let items = service
        .list(Utc::now())
        .into_iter()
        .map(to_list_item)
        .collect::<Vec<_>>();
    let message = if items.is_empty() {
        "No medications added yet.".to_string()
    } else {
        format!("{} medication(s).", items.len())
    };
    MedicationListResponse { items, message }
}

/// Loads form values for editing; `None` when the ID is unknown.
#[flutter_rust_bridge::frb(sync)]
pub fn medication_get(id: String) -> Option<MedicationForm> {
    let service = service().ok()?;
    let now = Utc::now();
    service.load_draft(id.trim(), now).map(to_form)
}

/// Saves form values: creates when `id` is absent, updates otherwise.
///
/// # FFI contract
/// - Missing name/dosage/frequency returns `ok=false` and writes nothing.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn medication_save(id: Option<String>, form: MedicationForm) -> MedicationActionResponse {
    let service = match service() {
        Ok(service) => service,
        Err(err) => {
            return MedicationActionResponse::failure(format!("medication_save failed: {err}"))
        }
    };
    let draft = match to_draft(form) {
        Ok(draft) => draft,
        Err(err) => {
            return MedicationActionResponse::failure(format!("medication_save failed: {err}"))
        }
    };

    let is_update = id.as_deref().is_some_and(|id| !id.trim().is_empty());
    match service.save(id.as_deref(), draft) {
        Ok(saved_id) if is_update => MedicationActionResponse::success("Medication updated.", saved_id),
        Ok(saved_id) => MedicationActionResponse::success("Medication saved.", saved_id),
        Err(err) => MedicationActionResponse::failure(format!("medication_save failed: {err}")),
    }
}

/// Deletes every medication with `id`. Unknown IDs succeed.
#[flutter_rust_bridge::frb(sync)]
pub fn medication_delete(id: String) -> MedicationActionResponse {
    match service() {
        Ok(service) => {
            let id = id.trim().to_string();
            service.delete(&id);
            MedicationActionResponse::success("Medication deleted.", id)
        }
        Err(err) => MedicationActionResponse::failure(format!("medication_delete failed: {err}")),
    }
}

fn service() -> Result<&'static MedicationService<SqliteStore>, String> {
    SERVICE.get_or_try_init(|| {
        let db_path = resolve_db_path();
        let store = SqliteStore::open(&db_path).map_err(|err| {
            error!(
                "event=service_init module=ffi status=error error_code=store_open_failed error={err}"
            );
            format!("medication DB open failed: {err}")
        })?;
        Ok(MedicationService::new(MedicationRepository::new(store)))
    })
}

fn resolve_db_path() -> PathBuf {
    DB_PATH.get_or_init(db_path_from_env).clone()
}

fn to_draft(form: MedicationForm) -> Result<MedicationDraft, String> {
    let prescribed_at = from_epoch_ms(form.prescribed_epoch_ms)
        .ok_or_else(|| format!("invalid prescribed date `{}`", form.prescribed_epoch_ms))?;
    let refill_at = match form.refill_epoch_ms {
        Some(ms) => Some(from_epoch_ms(ms).ok_or_else(|| format!("invalid refill date `{ms}`"))?),
        None => None,
    };

    Ok(MedicationDraft {
        name: form.name,
        dosage: form.dosage,
        frequency: form.frequency,
        prescribed_at,
        refill_at,
        instructions: Some(form.instructions),
        prescriber: Some(form.prescriber),
        pills_remaining: parse_pill_count(&form.pills_remaining),
        total_pills: parse_pill_count(&form.total_pills),
    })
}

fn to_form(draft: MedicationDraft) -> MedicationForm {
    MedicationForm {
        name: draft.name,
        dosage: draft.dosage,
        frequency: draft.frequency,
        prescribed_epoch_ms: draft.prescribed_at.timestamp_millis(),
        refill_epoch_ms: draft.refill_at.map(|at| at.timestamp_millis()),
        instructions: draft.instructions.unwrap_or_default(),
        prescriber: draft.prescriber.unwrap_or_default(),
        pills_remaining: draft
            .pills_remaining
            .map(|count| count.to_string())
            .unwrap_or_default(),
        total_pills: draft
            .total_pills
            .map(|count| count.to_string())
            .unwrap_or_default(),
    }
}

fn to_list_item(summary: MedicationSummary) -> MedicationListItem {
    let (refill_days, refill_label, refill_soon) = match summary.refill {
        Some(badge) => (
            Some(badge.days),
            Some(badge.label),
            badge.urgency == RefillUrgency::Soon,
        ),
        None => (None, None, false),
    };
    let (supply_percentage, supply_level, supply_label) = match summary.supply {
        Some(supply) => (
            Some(supply.supply.percentage),
            Some(supply_level_label(supply.supply.level).to_string()),
            Some(supply.label),
        ),
        None => (None, None, None),
    };

    MedicationListItem {
        id: summary.id,
        name: summary.name,
        subtitle: summary.subtitle,
        refill_days,
        refill_label,
        refill_soon,
        prescriber_label: summary.prescriber_label,
        supply_percentage,
        supply_level,
        supply_label,
        instructions: summary.instructions,
    }
}

fn supply_level_label(level: SupplyLevel) -> &'static str {
    match level {
        SupplyLevel::Critical => "critical",
        SupplyLevel::Low => "low",
        SupplyLevel::Healthy => "healthy",
    }
}

fn from_epoch_ms(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
}
