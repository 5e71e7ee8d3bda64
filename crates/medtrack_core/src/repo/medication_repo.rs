//! Medication collection persistence.
//!
//! # Responsibility
//! - Read and write the whole medication collection under one storage key.
//! - Provide add/update/delete as read-modify-write of that collection.
//!
//! # Invariants
//! - The collection is stored as one JSON array; order is preserved.
//! - `get_all`/`save_all` log and swallow failures; callers cannot tell
//!   "no data" from "read error".
//! - Mutations through one repository instance are serialized, so they
//!   never lose each other's writes. Separate instances over the same
//!   store are not coordinated.

use crate::model::medication::{Medication, MedicationId};
use crate::store::{KeyValueStore, StoreError};
use log::{debug, error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Storage key holding the serialized collection.
pub const MEDICATIONS_KEY: &str = "@medications";

pub type RepoResult<T> = Result<T, RepoError>;

/// Read or write failure at the persistence boundary.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    /// Stored value is not a valid medication array, or encoding failed.
    Serde(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Serde(err) => write!(f, "invalid medication collection json: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Serde(err) => Some(err),
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Medication collection repository over an injected key-value store.
pub struct MedicationRepository<S: KeyValueStore> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> MedicationRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the full collection, surfacing failures.
    ///
    /// A missing key yields an empty collection.
    pub fn try_get_all(&self) -> RepoResult<Vec<Medication>> {
        match self.store.get_item(MEDICATIONS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Serializes and writes the full collection, surfacing failures.
    pub fn try_save_all(&self, medications: &[Medication]) -> RepoResult<()> {
        let raw = serde_json::to_string(medications)?;
        self.store.set_item(MEDICATIONS_KEY, &raw)?;
        Ok(())
    }

    /// Reads the full collection; empty on missing data or any failure.
    pub fn get_all(&self) -> Vec<Medication> {
        match self.try_get_all() {
            Ok(medications) => {
                debug!(
                    "event=medications_load module=repo status=ok count={}",
                    medications.len()
                );
                medications
            }
            Err(err) => {
                error!(
                    "event=medications_load module=repo status=error error_code={} error={err}",
                    error_code(&err)
                );
                Vec::new()
            }
        }
    }

    /// Writes the full collection; failures are logged and dropped.
    pub fn save_all(&self, medications: &[Medication]) {
        match self.try_save_all(medications) {
            Ok(()) => debug!(
                "event=medications_save module=repo status=ok count={}",
                medications.len()
            ),
            Err(err) => error!(
                "event=medications_save module=repo status=error error_code={} count={} error={err}",
                error_code(&err),
                medications.len()
            ),
        }
    }

    /// Returns the first record with `id`.
    pub fn get(&self, id: &str) -> Option<Medication> {
        self.get_all().into_iter().find(|m| m.id == id)
    }

    /// Appends `medication` to the collection. Duplicate ids are not checked.
    pub fn add(&self, medication: Medication) {
        self.add_with(|_| medication);
    }

    /// Appends the record built from the current collection, under the same
    /// write lock as the read. Returns the appended record's id.
    pub fn add_with(&self, build: impl FnOnce(&[Medication]) -> Medication) -> MedicationId {
        let _guard = self.lock_writes();
        let mut medications = self.get_all();
        let medication = build(&medications);
        let id = medication.id.clone();
        medications.push(medication);
        self.save_all(&medications);
        id
    }

    /// Replaces the first record whose id matches, in place.
    ///
    /// Unknown ids are a silent no-op and nothing is written.
    pub fn update(&self, medication: Medication) {
        let _guard = self.lock_writes();
        let mut medications = self.get_all();
        match medications.iter_mut().find(|m| m.id == medication.id) {
            Some(slot) => {
                *slot = medication;
                self.save_all(&medications);
            }
            None => warn!(
                "event=medication_update module=repo status=skipped reason=not_found id={}",
                medication.id
            ),
        }
    }

    /// Removes every record with `id` and writes the remainder back.
    pub fn delete(&self, id: &str) {
        let _guard = self.lock_writes();
        let mut medications = self.get_all();
        medications.retain(|m| m.id != id);
        self.save_all(&medications);
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // The guard protects no data, so a poisoned lock is still usable.
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::Store(_) => "store_failed",
        RepoError::Serde(_) => "json_invalid",
    }
}
