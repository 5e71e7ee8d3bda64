//! Flutter-facing bridge for MedTrack core.

pub mod api;
