use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::LedgerError;

use super::Ledger;

/// Persists the updated ledger next to the original order form, as
/// `<stem>_processed.csv` (numbered `<stem>_processed_2.csv`, ... when a
/// previous run already produced one). Returns the path written.
pub fn write_processed(ledger: &Ledger, order_form_path: &Path) -> Result<PathBuf, LedgerError> {
    let path = processed_path(order_form_path);

    let mut writer = csv::Writer::from_path(&path).map_err(|e| LedgerError::WriteFile {
        path: path.clone(),
        source: e,
    })?;

    writer
        .write_record(&ledger.header)
        .map_err(|e| LedgerError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

    for order in &ledger.orders {
        writer
            .write_record(order.values_for(&ledger.header))
            .map_err(|e| LedgerError::WriteFile {
                path: path.clone(),
                source: e,
            })?;
    }

    writer.flush().map_err(|e| LedgerError::WriteFile {
        path: path.clone(),
        source: csv::Error::from(e),
    })?;

    info!("Wrote processed ledger to {}", path.display());
    Ok(path)
}

fn processed_path(order_form_path: &Path) -> PathBuf {
    let directory = order_form_path.parent().unwrap_or_else(|| Path::new(""));
    let stem = order_form_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("orders");

    let mut candidate = directory.join(format!("{stem}_processed.csv"));
    let mut counter = 2u32;
    while candidate.exists() {
        candidate = directory.join(format!("{stem}_processed_{counter}.csv"));
        counter += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::read_order_form;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_form(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("orders.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_round_trip_preserves_columns() {
        let tmp = TempDir::new().unwrap();
        let path = write_form(
            tmp.path(),
            "pk,FieldName,Crop,Customer,Farm,Notes\n\
             1,North 40,Potato,Agri NW,Riverbend,ring gate code 4411\n",
        );

        let (mut ledger, _) = read_order_form(&path).unwrap();
        ledger.orders[0].mark_fulfilled("20240612");

        let written = write_processed(&ledger, &path).unwrap();
        assert!(written.ends_with("orders_processed.csv"));

        let (reread, _) = read_order_form(&written).unwrap();
        let order = &reread.orders[0];
        assert_eq!(order.get("Notes"), "ring gate code 4411");
        assert_eq!(order.field_name(), "North 40");
        assert_eq!(order.order_status(), "Complete");
        assert_eq!(order.get("Date_Acquired"), "20240612");
        assert_eq!(order.get("Reshoot"), "False");
    }

    #[test]
    fn test_collision_gets_numbered_name() {
        let tmp = TempDir::new().unwrap();
        let path = write_form(tmp.path(), "pk,FieldName,Customer,Farm\n1,A,B,C\n");
        let (ledger, _) = read_order_form(&path).unwrap();

        let first = write_processed(&ledger, &path).unwrap();
        let second = write_processed(&ledger, &path).unwrap();

        assert!(first.ends_with("orders_processed.csv"));
        assert!(second.ends_with("orders_processed_2.csv"));
        assert!(first.exists() && second.exists());
    }
}
