//! Medication record and form draft.
//!
//! # Invariants
//! - Serialized field names are camelCase and stable across releases,
//!   because the collection is stored as one JSON document.
//! - Date fields hold ISO-8601 strings verbatim; an unparseable value is
//!   preserved on round trip and only treated as missing by date math.
//! - Decoding one record never fails on field values: missing text reads
//!   as empty, non-integer counts read as absent, and unknown fields are
//!   carried through `extra` so rewriting the collection loses nothing.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Opaque record identifier. In practice epoch milliseconds in decimal.
pub type MedicationId = String;

/// Persisted medication record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: MedicationId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub dosage: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub frequency: String,
    /// ISO-8601 timestamp string.
    #[serde(default, deserialize_with = "lenient_text")]
    pub prescribed_date: String,
    /// ISO-8601 timestamp string.
    #[serde(
        default,
        deserialize_with = "lenient_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub refill_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub instructions: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub prescriber: Option<String>,
    /// May be negative in legacy data; display math ignores such values.
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub pills_remaining: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_pills: Option<i64>,
    /// Fields this version does not know, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Medication {
    /// Creates a record with required fields only.
    pub fn new(
        id: impl Into<MedicationId>,
        name: impl Into<String>,
        dosage: impl Into<String>,
        frequency: impl Into<String>,
        prescribed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dosage: dosage.into(),
            frequency: frequency.into(),
            prescribed_date: format_timestamp(prescribed_at),
            refill_date: None,
            instructions: None,
            prescriber: None,
            pills_remaining: None,
            total_pills: None,
            extra: Map::new(),
        }
    }

    /// Pill counts usable for inventory math: present and within `u32`.
    pub fn pill_counts(&self) -> (Option<u32>, Option<u32>) {
        (
            self.pills_remaining.and_then(|n| u32::try_from(n).ok()),
            self.total_pills.and_then(|n| u32::try_from(n).ok()),
        )
    }

    /// Parsed `prescribed_date`, or `None` when the stored string is not
    /// a valid timestamp.
    pub fn prescribed_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.prescribed_date)
    }

    /// Parsed `refill_date`; `None` when unset or unparseable.
    pub fn refill_at(&self) -> Option<DateTime<Utc>> {
        self.refill_date.as_deref().and_then(parse_timestamp)
    }
}

/// Medication fields as captured by the create/edit form, without `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationDraft {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub prescribed_at: DateTime<Utc>,
    pub refill_at: Option<DateTime<Utc>>,
    pub instructions: Option<String>,
    pub prescriber: Option<String>,
    pub pills_remaining: Option<u32>,
    pub total_pills: Option<u32>,
}

impl MedicationDraft {
    /// Empty draft as shown by a fresh "add medication" form.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            name: String::new(),
            dosage: String::new(),
            frequency: String::new(),
            prescribed_at: now,
            refill_at: None,
            instructions: None,
            prescriber: None,
            pills_remaining: None,
            total_pills: None,
        }
    }

    /// Builds the persisted record for `id`.
    ///
    /// Blank optional text fields are dropped rather than stored as `""`.
    pub fn into_medication(self, id: impl Into<MedicationId>) -> Medication {
        Medication {
            id: id.into(),
            name: self.name,
            dosage: self.dosage,
            frequency: self.frequency,
            prescribed_date: format_timestamp(self.prescribed_at),
            refill_date: self.refill_at.map(format_timestamp),
            instructions: non_blank(self.instructions),
            prescriber: non_blank(self.prescriber),
            pills_remaining: self.pills_remaining.map(i64::from),
            total_pills: self.total_pills.map(i64::from),
            extra: Map::new(),
        }
    }

    /// Rebuilds a draft from a stored record for editing.
    ///
    /// An unparseable `prescribed_date` falls back to `now`; an unparseable
    /// `refill_date` is treated as unset.
    pub fn from_medication(medication: &Medication, now: DateTime<Utc>) -> Self {
        let (pills_remaining, total_pills) = medication.pill_counts();
        Self {
            name: medication.name.clone(),
            dosage: medication.dosage.clone(),
            frequency: medication.frequency.clone(),
            prescribed_at: medication.prescribed_at().unwrap_or(now),
            refill_at: medication.refill_at(),
            instructions: medication.instructions.clone(),
            prescriber: medication.prescriber.clone(),
            pills_remaining,
            total_pills,
        }
    }
}

/// Formats a timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Reads a string field, treating `null` and non-string values as empty.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

/// Reads an optional string field; `null` and non-string values are absent.
fn lenient_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

/// Reads a count field; integral numbers (including `-2` or `3.0`) are kept,
/// anything else is absent.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.fract() == 0.0 && value.abs() < 9.0e15)
                .map(|value| value as i64)
        }),
        _ => None,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, parse_timestamp, Medication, MedicationDraft};
    use chrono::{TimeZone, Utc};

    #[test]
    fn serializes_camel_case_and_omits_absent_optionals() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let mut medication = Medication::new("1", "Aspirin", "81mg", "daily", at);
        medication.pills_remaining = Some(12);

        let json = serde_json::to_value(&medication).unwrap();
        assert_eq!(json["prescribedDate"], "2024-03-01T08:30:00.000Z");
        assert_eq!(json["pillsRemaining"], 12);
        assert!(json.get("refillDate").is_none());
        assert!(json.get("totalPills").is_none());
    }

    #[test]
    fn deserializes_null_and_missing_optionals_as_none() {
        let raw = r#"{"id":"7","name":"Lisinopril","dosage":"10mg","frequency":"once daily",
            "prescribedDate":"2024-01-05T00:00:00.000Z","refillDate":null}"#;
        let medication: Medication = serde_json::from_str(raw).unwrap();
        assert_eq!(medication.refill_date, None);
        assert_eq!(medication.instructions, None);
        assert_eq!(medication.total_pills, None);
    }

    #[test]
    fn tolerates_odd_legacy_values_and_keeps_unknown_fields() {
        let raw = r#"{"id":3,"name":null,"dosage":"5mg","frequency":"daily",
            "prescribedDate":"2024-01-05T00:00:00.000Z","pillsRemaining":-2,
            "totalPills":"thirty","prescriber":42,"colorTag":"blue"}"#;
        let medication: Medication = serde_json::from_str(raw).unwrap();
        assert_eq!(medication.id, "3");
        assert_eq!(medication.name, "");
        assert_eq!(medication.pills_remaining, Some(-2));
        assert_eq!(medication.total_pills, None);
        assert_eq!(medication.prescriber, None);
        assert_eq!(medication.pill_counts(), (None, None));

        let json = serde_json::to_value(&medication).unwrap();
        assert_eq!(json["colorTag"], "blue");
        assert_eq!(json["pillsRemaining"], -2);
    }

    #[test]
    fn fractional_counts_read_as_absent() {
        let raw = r#"{"id":"1","name":"A","dosage":"1mg","frequency":"daily",
            "prescribedDate":"x","pillsRemaining":2.5,"totalPills":30.0}"#;
        let medication: Medication = serde_json::from_str(raw).unwrap();
        assert_eq!(medication.pills_remaining, None);
        assert_eq!(medication.total_pills, Some(30));
    }

    #[test]
    fn timestamp_helpers_accept_offsets_and_reject_garbage() {
        let parsed = parse_timestamp("2024-06-01T02:00:00+02:00").unwrap();
        assert_eq!(format_timestamp(parsed), "2024-06-01T00:00:00.000Z");
        assert!(parse_timestamp("next tuesday").is_none());
    }

    #[test]
    fn draft_drops_blank_optional_text() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut draft = MedicationDraft::empty(now);
        draft.name = "Metformin".to_string();
        draft.instructions = Some("   ".to_string());
        draft.prescriber = Some("Smith".to_string());

        let medication = draft.into_medication("42");
        assert_eq!(medication.instructions, None);
        assert_eq!(medication.prescriber.as_deref(), Some("Smith"));
    }

    #[test]
    fn draft_from_medication_tolerates_bad_dates() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut medication = Medication::new("1", "A", "1mg", "daily", now);
        medication.prescribed_date = "garbage".to_string();
        medication.refill_date = Some("also garbage".to_string());

        let draft = MedicationDraft::from_medication(&medication, now);
        assert_eq!(draft.prescribed_at, now);
        assert_eq!(draft.refill_at, None);
    }
}
