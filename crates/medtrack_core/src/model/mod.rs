//! Domain model for tracked medications.
//!
//! # Responsibility
//! - Define the persisted medication record and its wire shape.
//! - Define the draft shape produced by create/edit forms.
//!
//! # Invariants
//! - Every record is identified by an opaque string `MedicationId`.
//! - The model performs no validation; required-field checks belong to
//!   the service layer.

pub mod medication;
