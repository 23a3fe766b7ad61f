//! Goods receipt notes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::measurement::{GrnField, Measurement, MeasurementRange, QualityParams};
use super::status::{ApprovalKind, GrnStatus, Transition};
use crate::error::{Error, Result};

/// Opaque GRN identifier, derived from the creation time in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrnId(u64);

impl std::fmt::Display for GrnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out time-derived ids that strictly increase, even when several GRNs
/// are created within the same millisecond or the clock steps backwards.
#[derive(Debug, Clone, Default)]
pub struct GrnIdGenerator {
    last: u64,
}

impl GrnIdGenerator {
    /// Produce the id for a GRN created at `now`.
    pub fn next(&mut self, now: DateTime<Utc>) -> GrnId {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = millis.max(self.last + 1);
        self.last = id;
        GrnId(id)
    }
}

/// A goods receipt note: one sampled lot on a truck.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grn {
    id: GrnId,
    grn_number: String,
    moisture_value: Option<Measurement>,
    quality_params: QualityParams,
    status: GrnStatus,
    created_at: DateTime<Utc>,
}

impl Grn {
    /// Create an empty draft GRN.
    pub(crate) fn new(id: GrnId, grn_number: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            grn_number: grn_number.into(),
            moisture_value: None,
            quality_params: QualityParams::default(),
            status: GrnStatus::Draft,
            created_at,
        }
    }

    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> GrnId {
        self.id
    }

    /// GRN number, unique within the owning truck.
    #[must_use]
    pub fn grn_number(&self) -> &str {
        &self.grn_number
    }

    /// Moisture reading.
    #[must_use]
    pub fn moisture(&self) -> Option<&Measurement> {
        self.moisture_value.as_ref()
    }

    /// Quality readings.
    #[must_use]
    pub fn quality(&self) -> &QualityParams {
        &self.quality_params
    }

    /// Current approval status.
    #[must_use]
    pub fn status(&self) -> GrnStatus {
        self.status
    }

    /// When the GRN was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Read any editable field.
    #[must_use]
    pub fn value(&self, field: GrnField) -> Option<&Measurement> {
        match field {
            GrnField::Moisture => self.moisture_value.as_ref(),
            GrnField::Quality(param) => self.quality_params.get(param),
        }
    }

    /// Parse `input` within `range` and write it to an editable field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnlyField`] once the GRN has left the draft state,
    /// otherwise any parse error from [`MeasurementRange::parse`].
    pub(crate) fn set_value(
        &mut self,
        field: GrnField,
        input: &str,
        range: &MeasurementRange,
    ) -> Result<()> {
        if !self.status.is_editable() {
            return Err(Error::ReadOnlyField {
                grn_number: self.grn_number.clone(),
                status: self.status,
            });
        }

        let value = range.parse(input)?;
        match field {
            GrnField::Moisture => self.moisture_value = value,
            GrnField::Quality(param) => self.quality_params.set(param, value),
        }
        Ok(())
    }

    /// Apply an approval; mismatched approvals leave the status alone.
    pub(crate) fn approve(&mut self, kind: ApprovalKind) -> Transition {
        let transition = self.status.apply(kind);
        self.status = transition.status();
        transition
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::model::measurement::QualityParam;

    fn sample() -> Grn {
        let mut ids = GrnIdGenerator::default();
        let now = Utc::now();
        Grn::new(ids.next(now), "G-1", now)
    }

    #[test]
    fn test_new_grn_is_empty_draft() {
        let grn = sample();
        assert_eq!(grn.grn_number(), "G-1");
        assert_eq!(grn.status(), GrnStatus::Draft);
        assert!(grn.moisture().is_none());
        assert!(grn.quality().is_empty());
    }

    #[test]
    fn test_id_is_time_derived() {
        let mut ids = GrnIdGenerator::default();
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(ids.next(at).to_string(), "1700000000123");
    }

    #[test]
    fn test_ids_strictly_increase_within_same_millisecond() {
        let mut ids = GrnIdGenerator::default();
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let first = ids.next(at);
        let second = ids.next(at);
        let third = ids.next(at);
        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn test_ids_survive_clock_going_backwards() {
        let mut ids = GrnIdGenerator::default();
        let later = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let earlier = Utc.timestamp_millis_opt(1_600_000_000_000).unwrap();
        let first = ids.next(later);
        assert!(ids.next(earlier) > first);
    }

    #[test]
    fn test_set_value_on_draft() {
        let mut grn = sample();
        let range = MeasurementRange::default();
        grn.set_value(GrnField::Moisture, "14.2", &range).unwrap();
        grn.set_value(GrnField::Quality(QualityParam::Mold), "1", &range)
            .unwrap();

        assert_eq!(grn.moisture().unwrap().value(), 14.2);
        assert_eq!(
            grn.value(GrnField::Quality(QualityParam::Mold))
                .unwrap()
                .value(),
            1.0
        );
    }

    #[test]
    fn test_set_value_rejected_after_approval() {
        let mut grn = sample();
        grn.approve(ApprovalKind::Qc);

        let range = MeasurementRange::default();
        let result = grn.set_value(GrnField::Moisture, "", &range);
        assert!(matches!(result, Err(Error::ReadOnlyField { .. })));

        // Read-only wins over a malformed value.
        let result = grn.set_value(GrnField::Moisture, "wet", &range);
        assert!(matches!(result, Err(Error::ReadOnlyField { .. })));
    }

    #[test]
    fn test_approve_walks_workflow() {
        let mut grn = sample();
        assert!(!grn.approve(ApprovalKind::Mc).is_advanced());
        assert_eq!(grn.status(), GrnStatus::Draft);

        assert!(grn.approve(ApprovalKind::Qc).is_advanced());
        assert!(grn.approve(ApprovalKind::Mc).is_advanced());
        assert_eq!(grn.status(), GrnStatus::McApproved);

        assert!(!grn.approve(ApprovalKind::Qc).is_advanced());
        assert!(!grn.approve(ApprovalKind::Mc).is_advanced());
        assert_eq!(grn.status(), GrnStatus::McApproved);
    }

    #[test]
    fn test_grn_serialization_keys() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"grnNumber\":\"G-1\""));
        assert!(json.contains("\"moistureValue\":null"));
        assert!(json.contains("\"status\":\"draft\""));
        assert!(json.contains("\"qualityParams\""));
    }
}
