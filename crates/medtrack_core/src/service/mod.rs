//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into form/list level APIs.
//! - Keep FFI and UI layers decoupled from storage details.

pub mod medication_service;
pub mod refill;
pub mod summary;
