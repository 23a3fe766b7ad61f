//! Trucks and the GRNs attached to them.

use serde::Serialize;

use super::grn::Grn;
use super::status::GrnStatus;

/// A registered truck delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Truck {
    truck_number: String,
    grns: Vec<Grn>,
}

impl Truck {
    /// Create a truck with no GRNs.
    pub(crate) fn new(truck_number: impl Into<String>) -> Self {
        Self {
            truck_number: truck_number.into(),
            grns: Vec::new(),
        }
    }

    /// Truck number, unique within a session.
    #[must_use]
    pub fn truck_number(&self) -> &str {
        &self.truck_number
    }

    /// GRNs in the order they were added.
    #[must_use]
    pub fn grns(&self) -> &[Grn] {
        &self.grns
    }

    /// GRN at `index`.
    #[must_use]
    pub fn grn(&self, index: usize) -> Option<&Grn> {
        self.grns.get(index)
    }

    /// Position of the GRN with the given number.
    #[must_use]
    pub fn grn_index(&self, grn_number: &str) -> Option<usize> {
        self.grns
            .iter()
            .position(|grn| grn.grn_number() == grn_number)
    }

    /// Check if a GRN with this number is already attached.
    #[must_use]
    pub fn has_grn(&self, grn_number: &str) -> bool {
        self.grn_index(grn_number).is_some()
    }

    /// Number of attached GRNs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grns.len()
    }

    /// Check if no GRNs are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grns.is_empty()
    }

    /// Number of GRNs in the given status.
    #[must_use]
    pub fn count_with_status(&self, status: GrnStatus) -> usize {
        self.grns
            .iter()
            .filter(|grn| grn.status() == status)
            .count()
    }

    pub(crate) fn push(&mut self, grn: Grn) {
        self.grns.push(grn);
    }

    pub(crate) fn grn_mut(&mut self, index: usize) -> Option<&mut Grn> {
        self.grns.get_mut(index)
    }
}
