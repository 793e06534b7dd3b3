use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SorterError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Match error: {0}")]
    Match(#[from] MatchError),

    #[error("Placement error: {0}")]
    Placement(#[from] PlacementError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Order form not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read order form '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Order form '{path}' has no header row")]
    MissingHeader { path: PathBuf },

    #[error("Failed to write ledger '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// A filename that does not follow the `DATE_TOKENS_PRODUCT.EXT` layout.
/// Never fatal: the file is skipped and reported.
#[derive(Error, Debug)]
pub enum FilenameError {
    #[error("Filename '{filename}' has fewer than two underscore-delimited segments")]
    TooFewSegments { filename: String },

    #[error("Filename '{filename}' must end in a single 'PRODUCT.EXT' segment")]
    MalformedProductSegment { filename: String },
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source directory not found: {0}")]
    NotFound(PathBuf),

    #[error("Directory scan failed for '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

#[derive(Error, Debug)]
pub enum MatchError {
    /// An extension outside tif/jpg/jpeg points at a data problem that
    /// needs human review, so the whole run stops here.
    #[error("File '{filename}' has unrecognized extension '{extension}' (not 'tif', 'jpg', or 'jpeg')")]
    UnrecognizedExtension { filename: String, extension: String },
}

#[derive(Error, Debug)]
pub enum PlacementError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy file from '{from}' to '{to}': {source}")]
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move file from '{from}' to '{to}': {source}")]
    MoveFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rename file from '{from}' to '{to}': {source}")]
    RenameFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write log file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SorterError>;
