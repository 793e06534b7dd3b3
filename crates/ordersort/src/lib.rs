pub mod batch;
pub mod error;
pub mod ledger;
pub mod matcher;
pub mod photo;
pub mod renamer;
pub mod report;
pub mod router;
pub mod storage;

pub use batch::{parse_and_process_orders, BatchRunner, SortConfig, SortSummary};
pub use error::{
    FilenameError, LedgerError, MatchError, PlacementError, ReportError, Result, ScanError,
    SorterError,
};
pub use ledger::{Ledger, OrderRecord};
pub use matcher::MatchStrategy;
pub use photo::PhotoFile;
pub use renamer::parse_and_rename_orders;
pub use router::{RoutePlan, Router};
pub use storage::FilePlacer;
