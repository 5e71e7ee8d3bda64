//! List-screen projection of medication records.

use crate::model::medication::{Medication, MedicationId};
use crate::service::refill::{
    days_until_refill, pill_supply, refill_urgency, PillSupply, RefillUrgency,
};
use chrono::{DateTime, Utc};

/// Refill countdown badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefillBadge {
    pub days: i64,
    pub urgency: RefillUrgency,
    /// e.g. `"5d"`.
    pub label: String,
}

/// Pill supply with its display label.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplySummary {
    pub supply: PillSupply,
    /// e.g. `"12 of 30 pills remaining"`.
    pub label: String,
}

/// One row of the medication list.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationSummary {
    pub id: MedicationId,
    pub name: String,
    /// `"{dosage} • {frequency}"`.
    pub subtitle: String,
    pub refill: Option<RefillBadge>,
    /// `"Dr. {prescriber}"`.
    pub prescriber_label: Option<String>,
    pub supply: Option<SupplySummary>,
    pub instructions: Option<String>,
}

impl MedicationSummary {
    pub fn from_medication(medication: &Medication, now: DateTime<Utc>) -> Self {
        let refill = days_until_refill(medication.refill_date.as_deref(), now).map(|days| {
            RefillBadge {
                days,
                urgency: refill_urgency(days),
                label: format!("{days}d"),
            }
        });
        let (remaining, total) = medication.pill_counts();
        let supply = pill_supply(remaining, total).map(
            |supply| SupplySummary {
                label: format!(
                    "{} of {} pills remaining",
                    supply.remaining, supply.total
                ),
                supply,
            },
        );

        Self {
            id: medication.id.clone(),
            name: medication.name.clone(),
            subtitle: format!("{} • {}", medication.dosage, medication.frequency),
            refill,
            prescriber_label: non_empty(medication.prescriber.as_deref())
                .map(|prescriber| format!("Dr. {prescriber}")),
            supply,
            instructions: non_empty(medication.instructions.as_deref()).map(str::to_string),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::MedicationSummary;
    use crate::model::medication::Medication;
    use crate::service::refill::{RefillUrgency, SupplyLevel};
    use chrono::{TimeZone, Utc};

    #[test]
    fn builds_labels_for_fully_populated_record() {
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let mut medication = Medication::new("9", "Lisinopril", "10mg", "Once daily", now);
        medication.refill_date = Some("2024-04-04T00:00:00.000Z".to_string());
        medication.prescriber = Some("Smith".to_string());
        medication.pills_remaining = Some(6);
        medication.total_pills = Some(30);
        medication.instructions = Some("Take with food".to_string());

        let summary = MedicationSummary::from_medication(&medication, now);
        assert_eq!(summary.subtitle, "10mg • Once daily");
        let refill = summary.refill.expect("refill badge");
        assert_eq!(refill.label, "3d");
        assert_eq!(refill.urgency, RefillUrgency::Soon);
        assert_eq!(summary.prescriber_label.as_deref(), Some("Dr. Smith"));
        let supply = summary.supply.expect("supply");
        assert_eq!(supply.label, "6 of 30 pills remaining");
        assert_eq!(supply.supply.level, SupplyLevel::Critical);
        assert_eq!(summary.instructions.as_deref(), Some("Take with food"));
    }

    #[test]
    fn minimal_record_has_no_optional_rows() {
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let medication = Medication::new("1", "Aspirin", "81mg", "daily", now);

        let summary = MedicationSummary::from_medication(&medication, now);
        assert!(summary.refill.is_none());
        assert!(summary.prescriber_label.is_none());
        assert!(summary.supply.is_none());
        assert!(summary.instructions.is_none());
    }
}
