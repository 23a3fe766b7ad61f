//! Core data types for qcsampling.
//!
//! A session holds trucks; each truck holds up to a configured number of
//! goods receipt notes (GRNs); each GRN carries a moisture reading, six
//! quality readings and an approval status.

mod grn;
mod measurement;
mod status;
mod truck;

pub use grn::{Grn, GrnId, GrnIdGenerator};
pub use measurement::{
    GrnField, Measurement, MeasurementRange, QualityParam, QualityParams, DEFAULT_MAX,
    DEFAULT_MIN,
};
pub use status::{ApprovalKind, GrnStatus, Transition};
pub use truck::Truck;
