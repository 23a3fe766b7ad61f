//! The in-memory QC sampling session.
//!
//! A [`Session`] owns the current [`Registry`] snapshot. Every mutation
//! validates its input against that snapshot, builds the next snapshot and
//! swaps it in only on success, so a rejected operation never leaves a
//! partially applied change behind.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{
    ApprovalKind, Grn, GrnField, GrnIdGenerator, GrnStatus, MeasurementRange, Transition,
    Truck,
};

/// Maximum number of GRNs per truck unless configured otherwise.
pub const DEFAULT_GRN_CAPACITY: usize = 6;

/// Rules a session enforces on every mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    /// Maximum number of GRNs per truck.
    pub grn_capacity: usize,
    /// Accepted measurement values.
    pub range: MeasurementRange,
    /// Report mismatched approvals instead of ignoring them.
    pub strict_transitions: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            grn_capacity: DEFAULT_GRN_CAPACITY,
            range: MeasurementRange::default(),
            strict_transitions: false,
        }
    }
}

/// An immutable snapshot of all trucks in a session, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Registry {
    trucks: Vec<Truck>,
}

/// Counts of trucks and GRNs by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Registered trucks.
    pub trucks: usize,
    /// GRNs across all trucks.
    pub grns: usize,
    /// GRNs awaiting QC approval.
    pub draft: usize,
    /// GRNs awaiting MC approval.
    pub qc_approved: usize,
    /// Fully approved GRNs.
    pub mc_approved: usize,
}

impl Registry {
    /// All trucks.
    #[must_use]
    pub fn trucks(&self) -> &[Truck] {
        &self.trucks
    }

    /// Truck at `index`.
    #[must_use]
    pub fn truck(&self, index: usize) -> Option<&Truck> {
        self.trucks.get(index)
    }

    /// Position of the truck with the given number.
    #[must_use]
    pub fn truck_index(&self, truck_number: &str) -> Option<usize> {
        self.trucks
            .iter()
            .position(|truck| truck.truck_number() == truck_number)
    }

    /// Number of registered trucks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trucks.len()
    }

    /// Check if no truck is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trucks.is_empty()
    }

    /// Tally trucks and GRN statuses.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            trucks: self.trucks.len(),
            ..Summary::default()
        };
        for truck in &self.trucks {
            summary.grns += truck.len();
            summary.draft += truck.count_with_status(GrnStatus::Draft);
            summary.qc_approved += truck.count_with_status(GrnStatus::QcApproved);
            summary.mc_approved += truck.count_with_status(GrnStatus::McApproved);
        }
        summary
    }

    fn truck_mut(&mut self, index: usize) -> Result<&mut Truck> {
        self.trucks
            .get_mut(index)
            .ok_or_else(|| Error::TruckNotFound(format!("#{index}")))
    }
}

/// A single data-entry session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    registry: Registry,
    limits: Limits,
    ids: GrnIdGenerator,
}

impl Session {
    /// Start an empty session with the given limits.
    #[must_use]
    pub fn new(limits: Limits) -> Self {
        Self {
            registry: Registry::default(),
            limits,
            ids: GrnIdGenerator::default(),
        }
    }

    /// The current snapshot.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The limits this session enforces.
    #[must_use]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Register a truck and return its position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] for a blank number and
    /// [`Error::DuplicateTruck`] if the number is already registered.
    pub fn add_truck(&mut self, truck_number: &str) -> Result<usize> {
        let result = self.try_add_truck(truck_number);
        log_outcome("add_truck", &result);
        result
    }

    fn try_add_truck(&mut self, truck_number: &str) -> Result<usize> {
        if truck_number.trim().is_empty() {
            return Err(Error::EmptyInput {
                what: "truck number",
            });
        }
        if self.registry.truck_index(truck_number).is_some() {
            return Err(Error::DuplicateTruck {
                truck_number: truck_number.to_string(),
            });
        }

        let mut next = self.registry.clone();
        next.trucks.push(Truck::new(truck_number));
        let index = next.trucks.len() - 1;
        self.commit(next);
        debug!(truck_number, index, "truck registered");
        Ok(index)
    }

    /// Attach a new draft GRN to the truck at `truck_index` and return the
    /// GRN's position on that truck.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] for a blank number,
    /// [`Error::TruckNotFound`] for a bad index, [`Error::Capacity`] if the
    /// truck is full and [`Error::DuplicateGrn`] if the truck already has a
    /// GRN with this number.
    pub fn add_grn(&mut self, truck_index: usize, grn_number: &str) -> Result<usize> {
        let result = self.try_add_grn(truck_index, grn_number);
        log_outcome("add_grn", &result);
        result
    }

    fn try_add_grn(&mut self, truck_index: usize, grn_number: &str) -> Result<usize> {
        if grn_number.trim().is_empty() {
            return Err(Error::EmptyInput { what: "GRN number" });
        }

        let mut next = self.registry.clone();
        let capacity = self.limits.grn_capacity;
        let truck = next.truck_mut(truck_index)?;
        if truck.len() >= capacity {
            return Err(Error::Capacity {
                truck_number: truck.truck_number().to_string(),
                capacity,
            });
        }
        if truck.has_grn(grn_number) {
            return Err(Error::DuplicateGrn {
                truck_number: truck.truck_number().to_string(),
                grn_number: grn_number.to_string(),
            });
        }

        let now = Utc::now();
        let id = self.ids.next(now);
        truck.push(Grn::new(id, grn_number, now));
        let index = truck.len() - 1;
        debug!(
            truck_number = truck.truck_number(),
            grn_number,
            %id,
            "GRN added"
        );
        self.commit(next);
        Ok(index)
    }

    /// Write a measurement on a draft GRN. Blank `value` clears the field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TruckNotFound`] / [`Error::GrnNotFound`] for bad
    /// indices, [`Error::InvalidNumber`] / [`Error::OutOfRange`] for bad
    /// values and [`Error::ReadOnlyField`] once the GRN is approved.
    pub fn update_field(
        &mut self,
        truck_index: usize,
        grn_index: usize,
        field: GrnField,
        value: &str,
    ) -> Result<()> {
        let result = self.try_update_field(truck_index, grn_index, field, value);
        log_outcome("update_field", &result);
        result
    }

    fn try_update_field(
        &mut self,
        truck_index: usize,
        grn_index: usize,
        field: GrnField,
        value: &str,
    ) -> Result<()> {
        let mut next = self.registry.clone();
        let range = self.limits.range;
        let grn = grn_mut(&mut next, truck_index, grn_index)?;
        grn.set_value(field, value, &range)?;
        debug!(grn_number = grn.grn_number(), %field, value, "field updated");
        self.commit(next);
        Ok(())
    }

    /// Apply an approval to a GRN.
    ///
    /// Approvals that do not match the current status are ignored and
    /// reported as [`Transition::Ignored`], unless the session runs with
    /// strict transitions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TruckNotFound`] / [`Error::GrnNotFound`] for bad
    /// indices and, in strict mode, [`Error::InvalidTransition`].
    pub fn approve(
        &mut self,
        truck_index: usize,
        grn_index: usize,
        kind: ApprovalKind,
    ) -> Result<Transition> {
        let result = self.try_approve(truck_index, grn_index, kind);
        log_outcome("approve", &result);
        result
    }

    fn try_approve(
        &mut self,
        truck_index: usize,
        grn_index: usize,
        kind: ApprovalKind,
    ) -> Result<Transition> {
        let mut next = self.registry.clone();
        let strict = self.limits.strict_transitions;
        let grn = grn_mut(&mut next, truck_index, grn_index)?;

        let transition = grn.approve(kind);
        match transition {
            Transition::Advanced { from, to } => {
                debug!(grn_number = grn.grn_number(), %from, %to, "GRN approved");
                self.commit(next);
            }
            Transition::Ignored { status } if strict => {
                return Err(Error::InvalidTransition {
                    grn_number: grn.grn_number().to_string(),
                    status,
                    kind,
                });
            }
            Transition::Ignored { status } => {
                debug!(grn_number = grn.grn_number(), %status, %kind, "approval ignored");
            }
        }
        Ok(transition)
    }

    fn commit(&mut self, next: Registry) {
        self.registry = next;
    }
}

fn grn_mut(registry: &mut Registry, truck_index: usize, grn_index: usize) -> Result<&mut Grn> {
    let truck = registry.truck_mut(truck_index)?;
    let truck_number = truck.truck_number().to_string();
    truck
        .grn_mut(grn_index)
        .ok_or_else(|| Error::GrnNotFound {
            truck_number,
            grn: format!("#{grn_index}"),
        })
}

fn log_outcome<T>(operation: &str, result: &Result<T>) {
    if let Err(err) = result {
        info!(operation, error = %err, "operation rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QualityParam;

    fn session() -> Session {
        Session::new(Limits::default())
    }

    fn session_with_truck(number: &str) -> Session {
        let mut session = session();
        session.add_truck(number).unwrap();
        session
    }

    #[test]
    fn test_add_truck_appends_in_order() {
        let mut session = session();
        assert_eq!(session.add_truck("TRK-01").unwrap(), 0);
        assert_eq!(session.add_truck("TRK-02").unwrap(), 1);

        let numbers: Vec<_> = session
            .registry()
            .trucks()
            .iter()
            .map(Truck::truck_number)
            .collect();
        assert_eq!(numbers, ["TRK-01", "TRK-02"]);
        assert!(session.registry().truck(0).unwrap().is_empty());
    }

    #[test]
    fn test_add_truck_rejects_blank() {
        let mut session = session();
        for input in ["", "   ", "\t\n"] {
            let result = session.add_truck(input);
            assert!(matches!(result, Err(Error::EmptyInput { .. })));
        }
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_add_truck_rejects_duplicate() {
        let mut session = session_with_truck("TRK-01");
        let result = session.add_truck("TRK-01");
        assert!(matches!(result, Err(Error::DuplicateTruck { .. })));
        assert_eq!(session.registry().len(), 1);
    }

    #[test]
    fn test_truck_numbers_are_case_sensitive() {
        let mut session = session_with_truck("TRK-01");
        assert!(session.add_truck("trk-01").is_ok());
        assert_eq!(session.registry().len(), 2);
    }

    #[test]
    fn test_new_grn_is_empty_draft() {
        let mut session = session_with_truck("TRK-01");
        let index = session.add_grn(0, "G-1").unwrap();

        let grn = session.registry().truck(0).unwrap().grn(index).unwrap();
        assert_eq!(grn.grn_number(), "G-1");
        assert_eq!(grn.status(), GrnStatus::Draft);
        assert!(grn.moisture().is_none());
        assert!(grn.quality().is_empty());
    }

    #[test]
    fn test_add_grn_rejects_blank() {
        let mut session = session_with_truck("TRK-01");
        let result = session.add_grn(0, "  ");
        assert!(matches!(result, Err(Error::EmptyInput { .. })));
        assert!(session.registry().truck(0).unwrap().is_empty());
    }

    #[test]
    fn test_add_grn_unknown_truck() {
        let mut session = session_with_truck("TRK-01");
        let result = session.add_grn(3, "G-1");
        assert!(matches!(result, Err(Error::TruckNotFound(_))));
    }

    #[test]
    fn test_seventh_grn_hits_capacity() {
        let mut session = session_with_truck("TRK-01");
        for n in 1..=6 {
            session.add_grn(0, &format!("G-{n}")).unwrap();
        }

        let result = session.add_grn(0, "G-7");
        assert!(matches!(result, Err(Error::Capacity { capacity: 6, .. })));
        assert_eq!(session.registry().truck(0).unwrap().len(), 6);
    }

    #[test]
    fn test_capacity_checked_before_duplicate() {
        let mut session = session_with_truck("TRK-01");
        for n in 1..=6 {
            session.add_grn(0, &format!("G-{n}")).unwrap();
        }
        let result = session.add_grn(0, "G-1");
        assert!(matches!(result, Err(Error::Capacity { .. })));
    }

    #[test]
    fn test_configured_capacity() {
        let mut session = Session::new(Limits {
            grn_capacity: 2,
            ..Limits::default()
        });
        session.add_truck("TRK-01").unwrap();
        session.add_grn(0, "G-1").unwrap();
        session.add_grn(0, "G-2").unwrap();
        assert!(matches!(
            session.add_grn(0, "G-3"),
            Err(Error::Capacity { capacity: 2, .. })
        ));
    }

    #[test]
    fn test_grn_numbers_unique_per_truck_only() {
        let mut session = session();
        session.add_truck("TRK-01").unwrap();
        session.add_grn(0, "G-1").unwrap();

        let result = session.add_grn(0, "G-1");
        assert!(matches!(result, Err(Error::DuplicateGrn { .. })));
        assert_eq!(session.registry().truck(0).unwrap().len(), 1);

        session.add_truck("TRK-02").unwrap();
        assert!(session.add_grn(1, "G-1").is_ok());
        assert_eq!(session.registry().summary().grns, 2);
    }

    #[test]
    fn test_grn_ids_increase_in_creation_order() {
        let mut session = session_with_truck("TRK-01");
        session.add_truck("TRK-02").unwrap();
        session.add_grn(0, "G-1").unwrap();
        session.add_grn(1, "G-1").unwrap();
        session.add_grn(0, "G-2").unwrap();

        let id = |t: usize, g: usize| session.registry().truck(t).unwrap().grn(g).unwrap().id();
        let first = id(0, 0);
        let second = id(1, 0);
        let third = id(0, 1);
        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn test_update_field_moisture_and_quality() {
        let mut session = session_with_truck("TRK-01");
        session.add_grn(0, "G-1").unwrap();

        session
            .update_field(0, 0, GrnField::Moisture, "13.5")
            .unwrap();
        session
            .update_field(0, 0, GrnField::Quality(QualityParam::DeadSeeds), "2")
            .unwrap();

        let grn = session.registry().truck(0).unwrap().grn(0).unwrap();
        assert_eq!(grn.moisture().unwrap().value(), 13.5);
        assert_eq!(
            grn.quality()
                .get(QualityParam::DeadSeeds)
                .unwrap()
                .value(),
            2.0
        );
    }

    #[test]
    fn test_update_field_blank_clears() {
        let mut session = session_with_truck("TRK-01");
        session.add_grn(0, "G-1").unwrap();
        session.update_field(0, 0, GrnField::Moisture, "10").unwrap();
        session.update_field(0, 0, GrnField::Moisture, "").unwrap();

        let grn = session.registry().truck(0).unwrap().grn(0).unwrap();
        assert!(grn.moisture().is_none());
    }

    #[test]
    fn test_update_field_out_of_range() {
        let mut session = session_with_truck("TRK-01");
        session.add_grn(0, "G-1").unwrap();
        session.update_field(0, 0, GrnField::Moisture, "12").unwrap();

        let result = session.update_field(0, 0, GrnField::Moisture, "100.5");
        assert!(matches!(result, Err(Error::OutOfRange { .. })));

        let grn = session.registry().truck(0).unwrap().grn(0).unwrap();
        assert_eq!(grn.moisture().unwrap().value(), 12.0);
    }

    #[test]
    fn test_update_field_range_not_enforced() {
        let mut session = Session::new(Limits {
            range: MeasurementRange {
                enforce: false,
                ..MeasurementRange::default()
            },
            ..Limits::default()
        });
        session.add_truck("TRK-01").unwrap();
        session.add_grn(0, "G-1").unwrap();

        assert!(session
            .update_field(0, 0, GrnField::Moisture, "100.5")
            .is_ok());
    }

    #[test]
    fn test_update_field_invalid_number() {
        let mut session = session_with_truck("TRK-01");
        session.add_grn(0, "G-1").unwrap();
        let result = session.update_field(0, 0, GrnField::Moisture, "wet");
        assert!(matches!(result, Err(Error::InvalidNumber { .. })));
    }

    #[test]
    fn test_update_field_read_only_after_approval() {
        let mut session = session_with_truck("TRK-01");
        session.add_grn(0, "G-1").unwrap();
        session.update_field(0, 0, GrnField::Moisture, "11").unwrap();
        session.approve(0, 0, ApprovalKind::Qc).unwrap();

        let result = session.update_field(0, 0, GrnField::Moisture, "20");
        assert!(matches!(result, Err(Error::ReadOnlyField { .. })));

        let result =
            session.update_field(0, 0, GrnField::Quality(QualityParam::Mold), "1");
        assert!(matches!(result, Err(Error::ReadOnlyField { .. })));

        let grn = session.registry().truck(0).unwrap().grn(0).unwrap();
        assert_eq!(grn.moisture().unwrap().value(), 11.0);
        assert!(grn.quality().is_empty());
    }

    #[test]
    fn test_update_field_unknown_grn() {
        let mut session = session_with_truck("TRK-01");
        let result = session.update_field(0, 0, GrnField::Moisture, "1");
        assert!(matches!(result, Err(Error::GrnNotFound { .. })));
    }

    #[test]
    fn test_mc_approve_on_draft_is_noop() {
        let mut session = session_with_truck("TRK-01");
        session.add_grn(0, "G-1").unwrap();

        let transition = session.approve(0, 0, ApprovalKind::Mc).unwrap();
        assert_eq!(
            transition,
            Transition::Ignored {
                status: GrnStatus::Draft
            }
        );
        let grn = session.registry().truck(0).unwrap().grn(0).unwrap();
        assert_eq!(grn.status(), GrnStatus::Draft);
    }

    #[test]
    fn test_full_approval_sequence() {
        let mut session = session_with_truck("TRK-01");
        session.add_grn(0, "G-1").unwrap();

        let qc = session.approve(0, 0, ApprovalKind::Qc).unwrap();
        assert_eq!(qc.status(), GrnStatus::QcApproved);
        let mc = session.approve(0, 0, ApprovalKind::Mc).unwrap();
        assert_eq!(mc.status(), GrnStatus::McApproved);

        for kind in [ApprovalKind::Qc, ApprovalKind::Mc] {
            let transition = session.approve(0, 0, kind).unwrap();
            assert!(!transition.is_advanced());
        }
        let grn = session.registry().truck(0).unwrap().grn(0).unwrap();
        assert_eq!(grn.status(), GrnStatus::McApproved);
    }

    #[test]
    fn test_strict_transitions_report_errors() {
        let mut session = Session::new(Limits {
            strict_transitions: true,
            ..Limits::default()
        });
        session.add_truck("TRK-01").unwrap();
        session.add_grn(0, "G-1").unwrap();

        let result = session.approve(0, 0, ApprovalKind::Mc);
        assert!(matches!(
            result,
            Err(Error::InvalidTransition {
                status: GrnStatus::Draft,
                kind: ApprovalKind::Mc,
                ..
            })
        ));
        let grn = session.registry().truck(0).unwrap().grn(0).unwrap();
        assert_eq!(grn.status(), GrnStatus::Draft);
    }

    #[test]
    fn test_approve_unknown_indices() {
        let mut session = session_with_truck("TRK-01");
        assert!(matches!(
            session.approve(1, 0, ApprovalKind::Qc),
            Err(Error::TruckNotFound(_))
        ));
        assert!(matches!(
            session.approve(0, 0, ApprovalKind::Qc),
            Err(Error::GrnNotFound { .. })
        ));
    }

    #[test]
    fn test_failed_operation_keeps_snapshot() {
        let mut session = session_with_truck("TRK-01");
        session.add_grn(0, "G-1").unwrap();
        let before = session.registry().clone();

        let _ = session.add_truck("TRK-01");
        let _ = session.add_grn(0, "G-1");
        let _ = session.update_field(0, 0, GrnField::Moisture, "-3");

        assert_eq!(session.registry(), &before);
    }

    #[test]
    fn test_summary_counts_statuses() {
        let mut session = session();
        session.add_truck("TRK-01").unwrap();
        session.add_truck("TRK-02").unwrap();
        session.add_grn(0, "G-1").unwrap();
        session.add_grn(0, "G-2").unwrap();
        session.add_grn(1, "G-1").unwrap();
        session.approve(0, 1, ApprovalKind::Qc).unwrap();
        session.approve(1, 0, ApprovalKind::Qc).unwrap();
        session.approve(1, 0, ApprovalKind::Mc).unwrap();

        assert_eq!(
            session.registry().summary(),
            Summary {
                trucks: 2,
                grns: 3,
                draft: 1,
                qc_approved: 1,
                mc_approved: 1,
            }
        );
    }

    #[test]
    fn test_two_truck_intake() {
        let mut session = session();
        session.add_truck("TRK-01").unwrap();
        session.add_grn(0, "G-1").unwrap();

        let registry = session.registry();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.truck(0).unwrap().len(), 1);
        assert_eq!(
            registry.truck(0).unwrap().grn(0).unwrap().status(),
            GrnStatus::Draft
        );

        assert!(matches!(
            session.add_grn(0, "G-1"),
            Err(Error::DuplicateGrn { .. })
        ));

        session.add_truck("TRK-02").unwrap();
        let trk02 = session.registry().truck_index("TRK-02").unwrap();
        assert!(session.add_grn(trk02, "G-1").is_ok());
    }
}
