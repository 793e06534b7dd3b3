use crate::error::MatchError;
use crate::ledger::OrderRecord;
use crate::photo::PhotoFile;

/// How a filename is tied back to an order. The customer/farm/field-name
/// boundary inside a filename is not recoverable, so two strategies exist;
/// exact-residual is the stricter one and the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// The order's customer, farm and field name (spaces replaced with
    /// underscores, joined with underscores, in that fixed order) must equal
    /// the filename's residual exactly.
    #[default]
    ExactResidual,
    /// The token before the product segment must equal the field name, and
    /// the customer and farm must each appear somewhere in the filename.
    /// Usable when field names are single tokens but customer/farm
    /// boundaries are not reliable.
    Positional,
}

impl MatchStrategy {
    pub fn matches(&self, order: &OrderRecord, photo: &PhotoFile) -> bool {
        match self {
            MatchStrategy::ExactResidual => {
                let expected = format!(
                    "{}_{}_{}",
                    underscored(order.customer()),
                    underscored(order.farm()),
                    underscored(order.field_name())
                );
                photo.residual() == expected
            }
            MatchStrategy::Positional => {
                photo.field_token() == Some(underscored(order.field_name()).as_str())
                    && photo.filename.contains(&underscored(order.customer()))
                    && photo.filename.contains(&underscored(order.farm()))
            }
        }
    }
}

/// Order fields appear in filenames with underscores in place of spaces.
fn underscored(value: &str) -> String {
    value.replace(' ', "_")
}

/// An order is fulfilled only when every product variant it lists has both
/// a GeoTIFF and a JPEG among the matched files. A file with any other
/// extension is a data problem that needs human review, so it stops the run.
pub fn every_match_present(
    order: &OrderRecord,
    matched: &[&PhotoFile],
) -> Result<bool, MatchError> {
    for variant in order.product_variants() {
        let mut tif_present = false;
        let mut jpeg_present = false;

        for photo in matched {
            if photo.product != variant {
                continue;
            }
            if photo.is_tif() {
                tif_present = true;
            } else if photo.is_jpeg() {
                jpeg_present = true;
            } else {
                return Err(MatchError::UnrecognizedExtension {
                    filename: photo.filename.clone(),
                    extension: photo.extension.clone(),
                });
            }
        }

        if !(tif_present && jpeg_present) {
            return Ok(false);
        }
    }
    Ok(true)
}
