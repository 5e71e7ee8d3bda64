//! Medication use-case service.
//!
//! # Responsibility
//! - Run the create/edit form save flow: required-field checks, id
//!   assignment, record construction.
//! - Provide form prefill and list-screen projections.
//!
//! # Invariants
//! - Drafts with blank `name`, `dosage` or `frequency` never reach storage.
//! - Generated ids are epoch milliseconds, bumped until unused.
//! - Saving with an existing id replaces that record; it never appends.

use crate::model::medication::{Medication, MedicationDraft, MedicationId};
use crate::repo::medication_repo::MedicationRepository;
use crate::service::summary::MedicationSummary;
use crate::store::KeyValueStore;
use chrono::{DateTime, Utc};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PILL_COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?)(\d+)").expect("valid pill count regex"));

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for medication use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Listed fields were empty or whitespace-only.
    MissingRequiredFields(Vec<&'static str>),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequiredFields(fields) => {
                write!(f, "missing required fields: {}", fields.join(", "))
            }
        }
    }
}

impl Error for ServiceError {}

/// Use-case service wrapper for medication tracking.
pub struct MedicationService<S: KeyValueStore> {
    repo: MedicationRepository<S>,
}

impl<S: KeyValueStore> MedicationService<S> {
    pub fn new(repo: MedicationRepository<S>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &MedicationRepository<S> {
        &self.repo
    }

    /// Saves a form draft using the current time for id generation.
    ///
    /// See [`MedicationService::save_at`].
    pub fn save(
        &self,
        existing_id: Option<&str>,
        draft: MedicationDraft,
    ) -> ServiceResult<MedicationId> {
        self.save_at(existing_id, draft, Utc::now())
    }

    /// Saves a form draft.
    ///
    /// # Contract
    /// - `existing_id = Some(non-blank)` updates that record (no-op when the
    ///   id is gone).
    /// - Otherwise a new id is derived from `now` and the record is appended.
    /// - Returns the id the record was saved under.
    pub fn save_at(
        &self,
        existing_id: Option<&str>,
        draft: MedicationDraft,
        now: DateTime<Utc>,
    ) -> ServiceResult<MedicationId> {
        validate_required(&draft)?;

        match existing_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                self.repo.update(draft.into_medication(id));
                info!("event=medication_save module=service status=ok mode=update id={id}");
                Ok(id.to_string())
            }
            None => {
                let id = self
                    .repo
                    .add_with(|existing| draft.into_medication(next_id(existing, now)));
                info!("event=medication_save module=service status=ok mode=create id={id}");
                Ok(id)
            }
        }
    }

    /// Returns the stored record as an editable draft.
    pub fn load_draft(&self, id: &str, now: DateTime<Utc>) -> Option<MedicationDraft> {
        self.repo
            .get(id)
            .map(|medication| MedicationDraft::from_medication(&medication, now))
    }

    pub fn get(&self, id: &str) -> Option<Medication> {
        self.repo.get(id)
    }

    /// Projects every stored record for the list screen, in stored order.
    pub fn list(&self, now: DateTime<Utc>) -> Vec<MedicationSummary> {
        self.repo
            .get_all()
            .iter()
            .map(|medication| MedicationSummary::from_medication(medication, now))
            .collect()
    }

    pub fn delete(&self, id: &str) {
        self.repo.delete(id);
        info!("event=medication_delete module=service status=ok id={id}");
    }
}

/// Leniently parses a pill count typed into a number field.
///
/// Leading whitespace and trailing garbage are ignored (`" 30 pills"` is 30).
/// Empty, non-numeric, negative or overflowing input yields `None`.
pub fn parse_pill_count(text: &str) -> Option<u32> {
    let captures = PILL_COUNT_RE.captures(text)?;
    let value: u32 = captures.get(2)?.as_str().parse().ok()?;
    if &captures[1] == "-" && value != 0 {
        return None;
    }
    Some(value)
}

fn next_id(existing: &[Medication], now: DateTime<Utc>) -> MedicationId {
    let mut candidate = now.timestamp_millis();
    loop {
        let id = candidate.to_string();
        if !existing.iter().any(|m| m.id == id) {
            return id;
        }
        candidate += 1;
    }
}

fn validate_required(draft: &MedicationDraft) -> ServiceResult<()> {
    let missing = [
        ("name", draft.name.as_str()),
        ("dosage", draft.dosage.as_str()),
        ("frequency", draft.frequency.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect::<Vec<_>>();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::MissingRequiredFields(missing))
    }
}
