//! Text and JSON rendering of a session.

use crate::error::Result;
use crate::model::{Grn, GrnField, GrnStatus, Truck};
use crate::session::{Registry, Summary};

/// Placeholder for a measurement that has not been entered.
const EMPTY_CELL: &str = "-";

/// Column separator for text tables.
const COLUMN_GAP: &str = "  ";

/// Badge text for a status.
#[must_use]
pub fn status_badge(status: GrnStatus) -> &'static str {
    status.label()
}

/// The action offered next to a GRN in the given status, if any.
#[must_use]
pub fn action_label(status: GrnStatus) -> Option<&'static str> {
    status.pending_approval().map(|kind| kind.action_label())
}

/// Render one truck and its GRN table.
///
/// Trucks without GRNs render only their heading line.
#[must_use]
pub fn render_truck(truck: &Truck, capacity: usize) -> String {
    let heading = format!(
        "Truck: {} ({}/{} GRNs)",
        truck.truck_number(),
        truck.len(),
        capacity
    );
    if truck.is_empty() {
        return heading;
    }

    let mut header = vec!["GRN Number".to_string()];
    header.extend(GrnField::all().map(|field| field.label().to_string()));
    header.push("Status".to_string());
    header.push("Action".to_string());

    let rows: Vec<Vec<String>> = truck.grns().iter().map(grn_row).collect();
    let mut lines = vec![heading];
    lines.extend(table(&header, &rows));
    lines.join("\n")
}

/// Render every truck in registration order.
#[must_use]
pub fn render_registry(registry: &Registry, capacity: usize) -> String {
    if registry.is_empty() {
        return "No trucks registered.".to_string();
    }
    registry
        .trucks()
        .iter()
        .map(|truck| render_truck(truck, capacity))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render session totals.
#[must_use]
pub fn render_summary(summary: &Summary) -> String {
    format!(
        "Trucks: {}\nGRNs:   {} ({}: {}, {}: {}, {}: {})",
        summary.trucks,
        summary.grns,
        status_badge(GrnStatus::Draft),
        summary.draft,
        status_badge(GrnStatus::QcApproved),
        summary.qc_approved,
        status_badge(GrnStatus::McApproved),
        summary.mc_approved,
    )
}

/// Serialize the registry as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(registry: &Registry) -> Result<String> {
    Ok(serde_json::to_string_pretty(registry)?)
}

fn grn_row(grn: &Grn) -> Vec<String> {
    let mut row = vec![grn.grn_number().to_string()];
    row.extend(GrnField::all().map(|field| {
        grn.value(field)
            .map_or_else(|| EMPTY_CELL.to_string(), |m| m.to_string())
    }));
    row.push(status_badge(grn.status()).to_string());
    row.push(action_label(grn.status()).unwrap_or_default().to_string());
    row
}

fn table(header: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    std::iter::once(header)
        .chain(rows.iter().map(Vec::as_slice))
        .map(|cells| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join(COLUMN_GAP)
                .trim_end()
                .to_string()
        })
        .collect()
}
