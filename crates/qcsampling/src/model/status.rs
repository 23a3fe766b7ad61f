//! GRN approval status and the two-stage approval state machine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Where a GRN stands in the approval workflow.
///
/// Status only moves forward, one step at a time:
/// `draft -> qc_approved -> mc_approved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrnStatus {
    /// Measurements are still being entered.
    #[default]
    Draft,
    /// Quality control has signed off.
    QcApproved,
    /// Moisture control has signed off. Terminal.
    McApproved,
}

/// The kind of approval a user can give.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalKind {
    /// Quality-control approval.
    Qc,
    /// Moisture-control approval.
    Mc,
}

/// Outcome of an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The GRN moved to a new status.
    Advanced {
        /// Status before the approval.
        from: GrnStatus,
        /// Status after the approval.
        to: GrnStatus,
    },
    /// The approval did not match the current status and was absorbed.
    Ignored {
        /// The unchanged status.
        status: GrnStatus,
    },
}

impl GrnStatus {
    /// All statuses in workflow order.
    pub const ALL: [Self; 3] = [Self::Draft, Self::QcApproved, Self::McApproved];

    /// Human-readable badge text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::QcApproved => "QC Approved",
            Self::McApproved => "MC Approved",
        }
    }

    /// Measurements may only be edited while the GRN is a draft.
    #[must_use]
    pub fn is_editable(self) -> bool {
        self == Self::Draft
    }

    /// Check if no further approval is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::McApproved
    }

    /// The approval that would advance this status, if any.
    #[must_use]
    pub fn pending_approval(self) -> Option<ApprovalKind> {
        match self {
            Self::Draft => Some(ApprovalKind::Qc),
            Self::QcApproved => Some(ApprovalKind::Mc),
            Self::McApproved => None,
        }
    }

    /// The status reached by applying `kind`, or `None` if the guard fails.
    #[must_use]
    pub fn next(self, kind: ApprovalKind) -> Option<Self> {
        match (self, kind) {
            (Self::Draft, ApprovalKind::Qc) => Some(Self::QcApproved),
            (Self::QcApproved, ApprovalKind::Mc) => Some(Self::McApproved),
            _ => None,
        }
    }

    /// Apply `kind` and describe what happened.
    #[must_use]
    pub fn apply(self, kind: ApprovalKind) -> Transition {
        match self.next(kind) {
            Some(to) => Transition::Advanced { from: self, to },
            None => Transition::Ignored { status: self },
        }
    }
}

impl std::fmt::Display for GrnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::QcApproved => write!(f, "qc_approved"),
            Self::McApproved => write!(f, "mc_approved"),
        }
    }
}

impl ApprovalKind {
    /// Text of the action button offering this approval.
    #[must_use]
    pub fn action_label(self) -> &'static str {
        match self {
            Self::Qc => "QC Approve",
            Self::Mc => "MC Approve",
        }
    }
}

impl std::fmt::Display for ApprovalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Qc => write!(f, "qc"),
            Self::Mc => write!(f, "mc"),
        }
    }
}

impl FromStr for ApprovalKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "qc" => Ok(Self::Qc),
            "mc" => Ok(Self::Mc),
            other => Err(Error::command(format!(
                "unknown approval kind '{other}' (expected qc or mc)"
            ))),
        }
    }
}

impl Transition {
    /// Status after the request, whether or not it advanced.
    #[must_use]
    pub fn status(self) -> GrnStatus {
        match self {
            Self::Advanced { to, .. } => to,
            Self::Ignored { status } => status,
        }
    }

    /// Check if the request changed the status.
    #[must_use]
    pub fn is_advanced(self) -> bool {
        matches!(self, Self::Advanced { .. })
    }
}
