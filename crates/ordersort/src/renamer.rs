//! The pk-tagging pass: instead of relocating deliverables, stamp each
//! matched file in place with the primary key of the order it belongs to,
//! turning `DATE_TOKENS_PRODUCT.EXT` into `DATE_TOKENS_PRODUCT_p{pk}.EXT`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, info_span};

use crate::error::{PlacementError, Result};
use crate::ledger::read_order_form;
use crate::matcher::MatchStrategy;
use crate::photo::{scan_source_dir, PhotoFile};
use crate::report::ReportWriter;

/// True when the segment before the extension already looks like a pk tag,
/// in which case the file is left alone.
fn is_pk_tagged(filename: &str) -> bool {
    let stem = filename.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(filename);
    stem.rsplit('_')
        .next()
        .map(|segment| segment.starts_with('p'))
        .unwrap_or(false)
}

fn tagged_name(photo: &PhotoFile, pk: &str) -> Option<String> {
    let (stem, ext) = photo.filename.rsplit_once('.')?;
    Some(format!("{stem}_p{pk}.{ext}"))
}

fn rename_in_place(
    source_dir: &Path,
    photo: &PhotoFile,
    pk: &str,
) -> std::result::Result<(), PlacementError> {
    if is_pk_tagged(&photo.filename) {
        debug!("{} already carries a pk tag, leaving it", photo.filename);
        return Ok(());
    }
    let Some(new_name) = tagged_name(photo, pk) else {
        return Ok(());
    };

    let from = source_dir.join(&photo.filename);
    let to = source_dir.join(&new_name);
    std::fs::rename(&from, &to).map_err(|e| PlacementError::RenameFile {
        from,
        to,
        source: e,
    })?;
    debug!("Tagged {} -> {}", photo.filename, new_name);
    Ok(())
}

/// Reads the order form, matches files in the source directory, and renames
/// each matched file once with its order's pk. Overlapping matches and
/// orders without matches are written to a diagnostic file next to the order
/// form. Returns the number of distinct files matched.
pub fn parse_and_rename_orders(
    order_form_path: impl Into<PathBuf>,
    source_dir: impl Into<PathBuf>,
) -> Result<usize> {
    let order_form_path = order_form_path.into();
    let source_dir = source_dir.into();
    let _span = info_span!("rename_run", order_form = %order_form_path.display()).entered();

    let form_dir = order_form_path.parent().unwrap_or_else(|| Path::new(""));
    let reports = ReportWriter::new(form_dir);

    let (ledger, duplicates) = read_order_form(&order_form_path)?;
    let (photos, _skipped) = scan_source_dir(&source_dir)?;

    if !duplicates.is_empty() {
        let mut content = String::from("The following are the duplicate orders:\n");
        for duplicate in &duplicates {
            content.push_str(duplicate);
            content.push('\n');
        }
        reports.write(
            &ReportWriter::timestamped_name("Order_duplicates", "txt"),
            &content,
        )?;
    }

    let strategy = MatchStrategy::default();
    let mut renamed: HashMap<String, Vec<usize>> = HashMap::new();
    let mut orders_without_matches: Vec<usize> = Vec::new();

    for (order_idx, order) in ledger.orders.iter().enumerate() {
        let matched: Vec<&PhotoFile> = photos
            .iter()
            .filter(|photo| strategy.matches(order, photo))
            .collect();

        if matched.is_empty() {
            orders_without_matches.push(order_idx);
            continue;
        }

        for photo in matched {
            if let Some(orders_for_file) = renamed.get_mut(&photo.filename) {
                orders_for_file.push(order_idx);
                continue;
            }
            rename_in_place(&source_dir, photo, order.pk())?;
            renamed.insert(photo.filename.clone(), vec![order_idx]);
        }
    }

    let mut message = String::new();
    let mut overlapped: Vec<(&String, &Vec<usize>)> =
        renamed.iter().filter(|(_, orders)| orders.len() > 1).collect();
    overlapped.sort_by(|a, b| a.0.cmp(b.0));
    for (filename, order_indices) in overlapped {
        message.push_str(&format!(
            "The file {filename} was matched by multiple different orders. The following orders matched with the file:\n"
        ));
        for &order_idx in order_indices {
            message.push_str(&format!("\t{}\n", ledger.orders[order_idx]));
        }
        message.push('\n');
    }
    if !orders_without_matches.is_empty() {
        message.push_str("The following orders had no matching images:\n");
        for &order_idx in &orders_without_matches {
            message.push_str(&format!("\t{}\n", ledger.orders[order_idx]));
        }
        message.push('\n');
    }
    if !message.is_empty() {
        reports.write(
            &ReportWriter::timestamped_name("Orderform_errors", "txt"),
            &message,
        )?;
    }

    info!("Tagged {} files with order pks", renamed.len());
    Ok(renamed.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pk_tagged() {
        assert!(is_pk_tagged("20240612_Foo_Field_RGB_p17.tif"));
        assert!(!is_pk_tagged("20240612_Foo_Field_RGB.tif"));
    }

    #[test]
    fn test_tagged_name_inserts_pk_before_extension() {
        let photo = PhotoFile::parse("20240612_Foo_Field_RGB.tif").unwrap();
        assert_eq!(
            tagged_name(&photo, "17").unwrap(),
            "20240612_Foo_Field_RGB_p17.tif"
        );
    }
}
