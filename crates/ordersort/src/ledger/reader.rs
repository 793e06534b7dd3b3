use std::path::Path;

use tracing::{info, warn};

use crate::error::LedgerError;

use super::{columns, Ledger, OrderRecord};

/// Reads the order form into a [`Ledger`], skipping rows that duplicate an
/// earlier order's identity. Returns the ledger together with a rendering of
/// every skipped duplicate so the caller can write them to a diagnostic file.
pub fn read_order_form(path: &Path) -> Result<(Ledger, Vec<String>), LedgerError> {
    if !path.is_file() {
        return Err(LedgerError::NotFound(path.to_path_buf()));
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| LedgerError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut header: Vec<String> = reader
        .headers()
        .map_err(|e| LedgerError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?
        .iter()
        .map(|s| s.to_string())
        .collect();

    if header.is_empty() || header.iter().all(|name| name.is_empty()) {
        return Err(LedgerError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let mut orders: Vec<OrderRecord> = Vec::new();
    let mut duplicates: Vec<String> = Vec::new();

    for row in reader.records() {
        let row = row.map_err(|e| LedgerError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let order = OrderRecord::from_row(&header, &row);
        if orders.iter().any(|existing| existing.same_identity(&order)) {
            warn!("Skipping duplicate order: {}", order);
            duplicates.push(order.to_string());
        } else {
            orders.push(order);
        }
    }

    // Status columns may be absent from a fresh order form; they still have
    // to appear in the persisted ledger, after the original columns.
    for column in columns::REQUIRED {
        if !header.iter().any(|name| name == column) {
            header.push((*column).to_string());
        }
    }

    info!(
        "Read {} orders ({} duplicates skipped) from {}",
        orders.len(),
        duplicates.len(),
        path.display()
    );

    Ok((Ledger { header, orders }, duplicates))
}
