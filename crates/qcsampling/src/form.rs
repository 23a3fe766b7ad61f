//! Text buffers behind the "Add Truck" and "Add GRN" inputs.

use crate::error::Result;
use crate::session::Session;

/// The two free-text inputs of the entry screen.
///
/// A buffer is cleared only when its submission succeeds, so a rejected
/// number stays in place for the user to correct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryForm {
    truck_number: String,
    grn_number: String,
}

impl EntryForm {
    /// Create a form with empty inputs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current truck-number input.
    #[must_use]
    pub fn truck_number(&self) -> &str {
        &self.truck_number
    }

    /// Current GRN-number input.
    #[must_use]
    pub fn grn_number(&self) -> &str {
        &self.grn_number
    }

    /// Replace the truck-number input.
    pub fn set_truck_number(&mut self, value: impl Into<String>) {
        self.truck_number = value.into();
    }

    /// Replace the GRN-number input.
    pub fn set_grn_number(&mut self, value: impl Into<String>) {
        self.grn_number = value.into();
    }

    /// Register the truck in the truck-number input.
    ///
    /// # Errors
    ///
    /// Propagates the error from [`Session::add_truck`]; the input is kept.
    pub fn submit_truck(&mut self, session: &mut Session) -> Result<usize> {
        let index = session.add_truck(&self.truck_number)?;
        self.truck_number.clear();
        Ok(index)
    }

    /// Attach the GRN in the GRN-number input to the truck at `truck_index`.
    ///
    /// # Errors
    ///
    /// Propagates the error from [`Session::add_grn`]; the input is kept.
    pub fn submit_grn(&mut self, session: &mut Session, truck_index: usize) -> Result<usize> {
        let index = session.add_grn(truck_index, &self.grn_number)?;
        self.grn_number.clear();
        Ok(index)
    }
}
