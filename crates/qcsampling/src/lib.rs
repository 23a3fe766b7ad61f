//! `qcsampling` - Quality-control sampling and approval for truck deliveries
//!
//! This library holds the in-memory session of a QC intake desk: trucks,
//! the goods-receipt notes (GRNs) attached to them, their moisture and
//! quality measurements, and the two-stage QC/MC approval workflow.
//!
//! All mutations go through [`Session`], which validates input and only
//! commits a new [`Registry`] snapshot when the operation succeeds.
//!
//! ```
//! use qcsampling::model::{ApprovalKind, GrnField, GrnStatus};
//! use qcsampling::Session;
//!
//! let mut session = Session::default();
//! let truck = session.add_truck("TRK-01").unwrap();
//! let grn = session.add_grn(truck, "G-1").unwrap();
//! session.update_field(truck, grn, GrnField::Moisture, "12.5").unwrap();
//! session.approve(truck, grn, ApprovalKind::Qc).unwrap();
//!
//! let status = session.registry().truck(truck).unwrap().grn(grn).unwrap().status();
//! assert_eq!(status, GrnStatus::QcApproved);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod model;
pub mod render;
pub mod session;
pub mod shell;

pub use config::Config;
pub use error::{Error, Result};
pub use form::EntryForm;
pub use logging::init_logging;
pub use session::{Limits, Registry, Session, Summary};
pub use shell::{RunStats, Shell};
