use std::fmt;
use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{FilenameError, ScanError};

/// The semantic fields of a deliverable filename:
/// `DATE_TOKENS_PRODUCT.EXT`, where TOKENS is the underscore-joined run of
/// customer/farm/field-name tokens. The delimiter between those three is the
/// same underscore used inside multi-word names, so they stay joined here as
/// the order-searchable residual.
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub filename: String,
    pub date: String,
    pub product: String,
    /// Lower-cased, without the dot.
    pub extension: String,
    residual: String,
}

impl PhotoFile {
    pub fn parse(filename: &str) -> Result<Self, FilenameError> {
        let segments: Vec<&str> = filename.split('_').collect();
        if segments.len() < 2 {
            return Err(FilenameError::TooFewSegments {
                filename: filename.to_string(),
            });
        }

        let last = segments[segments.len() - 1];
        let mut parts = last.split('.');
        let (product, extension) = match (parts.next(), parts.next(), parts.next()) {
            (Some(product), Some(extension), None) => (product, extension),
            _ => {
                return Err(FilenameError::MalformedProductSegment {
                    filename: filename.to_string(),
                })
            }
        };

        Ok(Self {
            filename: filename.to_string(),
            date: segments[0].to_string(),
            product: product.to_string(),
            extension: extension.to_lowercase(),
            residual: segments[1..segments.len() - 1].join("_"),
        })
    }

    /// The joined customer/farm/field-name portion of the filename.
    pub fn residual(&self) -> &str {
        &self.residual
    }

    /// The token directly before the product segment. When field names are
    /// single tokens this is the field name.
    pub fn field_token(&self) -> Option<&str> {
        if self.residual.is_empty() {
            None
        } else {
            self.residual.rsplit('_').next()
        }
    }

    pub fn is_tif(&self) -> bool {
        self.extension == "tif"
    }

    pub fn is_jpeg(&self) -> bool {
        self.extension == "jpg" || self.extension == "jpeg"
    }
}

/// Identity is the original filename; parsed fields don't participate.
impl PartialEq for PhotoFile {
    fn eq(&self, other: &Self) -> bool {
        self.filename == other.filename
    }
}

impl Eq for PhotoFile {}

impl fmt::Display for PhotoFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filename)
    }
}

/// Lists the source directory (top level only, directories skipped) and
/// parses every plain file into a [`PhotoFile`]. Filenames that don't follow
/// the expected layout are returned separately; they are skipped, not fatal.
pub fn scan_source_dir(path: &Path) -> Result<(Vec<PhotoFile>, Vec<String>), ScanError> {
    if !path.is_dir() {
        return Err(ScanError::NotFound(path.to_path_buf()));
    }

    let mut photos = Vec::new();
    let mut malformed = Vec::new();

    for entry in WalkDir::new(path).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| ScanError::ScanFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        if entry.path().is_dir() {
            continue;
        }

        let filename = entry.file_name().to_string_lossy().to_string();
        match PhotoFile::parse(&filename) {
            Ok(photo) => {
                debug!("Found deliverable: {}", filename);
                photos.push(photo);
            }
            Err(e) => {
                warn!("Skipping file with unexpected name: {}", e);
                malformed.push(filename);
            }
        }
    }

    info!(
        "Scanned {} deliverables ({} skipped) in {}",
        photos.len(),
        malformed.len(),
        path.display()
    );
    Ok((photos, malformed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_filename() {
        let photo = PhotoFile::parse("20240612_Agri_NW_Riverbend_North40_RGB.tif").unwrap();

        assert_eq!(photo.date, "20240612");
        assert_eq!(photo.residual(), "Agri_NW_Riverbend_North40");
        assert_eq!(photo.product, "RGB");
        assert_eq!(photo.extension, "tif");
    }

    #[test]
    fn test_extension_is_lowercased() {
        let photo = PhotoFile::parse("20240612_Foo_Bar_Field_FCIR.TIF").unwrap();
        assert_eq!(photo.extension, "tif");
        assert!(photo.is_tif());
    }

    #[test]
    fn test_reconstruction_reproduces_normalized_name() {
        let name = "20240612_Agri_NW_Riverbend_North40_RGB.jpg";
        let photo = PhotoFile::parse(name).unwrap();
        let rebuilt = format!(
            "{}_{}_{}.{}",
            photo.date,
            photo.residual(),
            photo.product,
            photo.extension
        );
        assert_eq!(rebuilt, name);
    }

    #[test]
    fn test_field_token_is_segment_before_product() {
        let photo = PhotoFile::parse("20240612_Agri_NW_Riverbend_North40_RGB.tif").unwrap();
        assert_eq!(photo.field_token(), Some("North40"));
    }

    #[test]
    fn test_too_few_segments_rejected() {
        assert!(matches!(
            PhotoFile::parse("photo.jpg"),
            Err(FilenameError::TooFewSegments { .. })
        ));
    }

    #[test]
    fn test_product_segment_needs_exactly_one_dot() {
        assert!(matches!(
            PhotoFile::parse("20240612_Field_RGB"),
            Err(FilenameError::MalformedProductSegment { .. })
        ));
        assert!(matches!(
            PhotoFile::parse("20240612_Field_RGB.tar.gz"),
            Err(FilenameError::MalformedProductSegment { .. })
        ));
    }

    #[test]
    fn test_equality_is_by_filename() {
        let a = PhotoFile::parse("20240612_Foo_Field_RGB.tif").unwrap();
        let b = PhotoFile::parse("20240612_Foo_Field_RGB.tif").unwrap();
        let c = PhotoFile::parse("20240613_Foo_Field_RGB.tif").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_scan_skips_directories_and_malformed_names() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("20240612_Foo_Field_RGB.tif"), b"x").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(tmp.path().join("20240612_sub_dir_RGB.tif")).unwrap();

        let (photos, malformed) = scan_source_dir(tmp.path()).unwrap();

        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].filename, "20240612_Foo_Field_RGB.tif");
        assert_eq!(malformed, vec!["notes.txt".to_string()]);
    }

    #[test]
    fn test_scan_missing_directory_is_an_error() {
        let result = scan_source_dir(Path::new("/nonexistent/photos"));
        assert!(matches!(result, Err(ScanError::NotFound(_))));
    }
}
