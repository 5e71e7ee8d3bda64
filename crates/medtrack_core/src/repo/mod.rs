//! Repository layer over the local key-value store.
//!
//! # Responsibility
//! - Own the serialized medication collection and its storage key.
//! - Isolate JSON encoding and store access from service orchestration.
//!
//! # Invariants
//! - Public mutations never propagate storage failures; the fallible
//!   `try_*` variants stay available for diagnostics and tests.

pub mod medication_repo;
