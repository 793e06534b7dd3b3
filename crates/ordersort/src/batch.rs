use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{error, info, info_span, warn};

use crate::error::Result;
use crate::ledger::{read_order_form, write_processed, Ledger};
use crate::matcher::{every_match_present, MatchStrategy};
use crate::photo::{scan_source_dir, PhotoFile};
use crate::report::ReportWriter;
use crate::router::Router;
use crate::storage::FilePlacer;

/// Inputs for one sorting pass. The caller (UI layer) is responsible for
/// having validated that the paths were actually selected.
#[derive(Debug, Clone)]
pub struct SortConfig {
    pub order_form_path: PathBuf,
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    /// Copy matched files instead of moving them.
    pub copy_files: bool,
    pub strategy: MatchStrategy,
    /// Also write unfulfilled orders out as a runnable order form.
    pub write_unfulfilled_orders: bool,
}

impl SortConfig {
    pub fn new(
        order_form_path: impl Into<PathBuf>,
        source_dir: impl Into<PathBuf>,
        target_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            order_form_path: order_form_path.into(),
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            copy_files: false,
            strategy: MatchStrategy::default(),
            write_unfulfilled_orders: false,
        }
    }
}

/// What one pass did, for the caller to render.
#[derive(Debug, Default)]
pub struct SortSummary {
    /// Distinct files placed at least once.
    pub files_placed: usize,
    pub orders_fulfilled: usize,
    pub orders_incomplete: usize,
    /// Source files skipped because their names didn't parse.
    pub skipped_filenames: Vec<String>,
    /// Files whose placement failed on an I/O error; the rest of the batch
    /// still ran.
    pub placement_failures: Vec<String>,
    pub processed_ledger: Option<PathBuf>,
}

/// Bookkeeping accumulated while routing.
#[derive(Default)]
struct RouteOutcome {
    /// Filename -> indices of every order that matched it, in match order.
    /// Entries with more than one order are the overlap diagnostics.
    index: HashMap<String, Vec<usize>>,
    placed: HashSet<String>,
    conflict_renames: Vec<String>,
    placement_failures: Vec<String>,
    orders_fulfilled: usize,
    orders_incomplete: usize,
    /// Orders that matched nothing at all.
    unmatched: Vec<usize>,
}

/// Runs the full pass: load ledger and directory listing, match files to
/// orders, route and place complete orders, then persist the updated ledger
/// and the diagnostics.
pub struct BatchRunner {
    config: SortConfig,
    router: Router,
    placer: FilePlacer,
    reports: ReportWriter,
}

impl BatchRunner {
    pub fn new(config: SortConfig) -> Self {
        let router = Router::new(config.copy_files);
        let placer = FilePlacer::new(&config.target_dir);
        let reports = ReportWriter::new(&config.target_dir);
        Self {
            config,
            router,
            placer,
            reports,
        }
    }

    pub fn run(&self) -> Result<SortSummary> {
        let _run_span = info_span!("sort_run",
            order_form = %self.config.order_form_path.display(),
            source = %self.config.source_dir.display(),
        )
        .entered();

        let (mut ledger, photos, skipped) = {
            let _step = info_span!("load").entered();
            self.step_load()?
        };

        let matches = {
            let _step = info_span!("match").entered();
            self.step_match(&ledger, &photos)
        };

        let outcome = {
            let _step = info_span!("route").entered();
            self.step_route(&mut ledger, &photos, &matches)?
        };

        let _step = info_span!("finalize").entered();
        self.step_finalize(&ledger, outcome, skipped)
    }

    fn step_load(&self) -> Result<(Ledger, Vec<PhotoFile>, Vec<String>)> {
        let (ledger, duplicates) = read_order_form(&self.config.order_form_path)?;
        // Scan before writing any diagnostics so a bad source path aborts
        // the run without leaving anything behind.
        let (photos, skipped) = scan_source_dir(&self.config.source_dir)?;

        if !duplicates.is_empty() {
            // Duplicate-order details land next to the order form itself,
            // where whoever maintains the form will see them.
            let form_dir = self
                .config
                .order_form_path
                .parent()
                .unwrap_or_else(|| Path::new(""));
            let mut content = String::from("The following are the duplicate orders:\n");
            for duplicate in &duplicates {
                content.push_str(duplicate);
                content.push('\n');
            }
            ReportWriter::new(form_dir).write(
                &ReportWriter::timestamped_name("Order_duplicates", "txt"),
                &content,
            )?;
        }

        Ok((ledger, photos, skipped))
    }

    /// For each order, the indices of every file satisfying the configured
    /// matching strategy.
    fn step_match(&self, ledger: &Ledger, photos: &[PhotoFile]) -> Vec<Vec<usize>> {
        ledger
            .orders
            .iter()
            .map(|order| {
                photos
                    .iter()
                    .enumerate()
                    .filter(|(_, photo)| self.config.strategy.matches(order, photo))
                    .map(|(idx, _)| idx)
                    .collect()
            })
            .collect()
    }

    fn step_route(
        &self,
        ledger: &mut Ledger,
        photos: &[PhotoFile],
        matches: &[Vec<usize>],
    ) -> Result<RouteOutcome> {
        let mut outcome = RouteOutcome::default();

        for (order_idx, matched) in matches.iter().enumerate() {
            if matched.is_empty() {
                ledger.orders[order_idx].mark_unfulfilled();
                outcome.orders_incomplete += 1;
                outcome.unmatched.push(order_idx);
                continue;
            }

            let matched_photos: Vec<&PhotoFile> =
                matched.iter().map(|&idx| &photos[idx]).collect();
            let complete = every_match_present(&ledger.orders[order_idx], &matched_photos)?;
            if !complete {
                warn!(
                    "Order not complete (missing a product/format pairing): {}",
                    ledger.orders[order_idx]
                );
                ledger.orders[order_idx].mark_unfulfilled();
                outcome.orders_incomplete += 1;
                continue;
            }

            // All files of one delivery share an acquisition date.
            let date = matched_photos[0].date.clone();

            let mut all_placed = true;
            for &photo_idx in matched {
                let photo = &photos[photo_idx];
                if let Some(orders_for_file) = outcome.index.get_mut(&photo.filename) {
                    // Already placed by an earlier order; record the overlap.
                    orders_for_file.push(order_idx);
                    continue;
                }

                if !self.place_file(ledger, order_idx, photo, &mut outcome) {
                    all_placed = false;
                }
                outcome
                    .index
                    .insert(photo.filename.clone(), vec![order_idx]);
            }

            // An order with a failed placement stays unfulfilled so a rerun
            // picks the remaining files up again.
            if all_placed {
                ledger.orders[order_idx].mark_fulfilled(&date);
                outcome.orders_fulfilled += 1;
            } else {
                warn!(
                    "Order had placement failures, leaving it unfulfilled: {}",
                    ledger.orders[order_idx]
                );
                ledger.orders[order_idx].mark_unfulfilled();
                outcome.orders_incomplete += 1;
            }
        }

        Ok(outcome)
    }

    /// Executes every placement planned for one file, returning whether all
    /// of them succeeded. An I/O failure aborts the remaining placements for
    /// this file only; placements already made (e.g. a secondary copy) stand.
    fn place_file(
        &self,
        ledger: &Ledger,
        order_idx: usize,
        photo: &PhotoFile,
        outcome: &mut RouteOutcome,
    ) -> bool {
        let plans = self.router.routes(&ledger.orders[order_idx], photo);
        let source = self.config.source_dir.join(&photo.filename);

        for plan in &plans {
            match self.placer.place(&source, plan) {
                Ok(placement) => {
                    outcome.placed.insert(photo.filename.clone());
                    if placement.conflict_renamed {
                        outcome.conflict_renames.push(format!(
                            "{} already existed at its destination; placed as {}",
                            photo.filename,
                            placement.path.display()
                        ));
                    }
                }
                Err(e) => {
                    error!("Failed to place {}: {}", photo.filename, e);
                    outcome
                        .placement_failures
                        .push(format!("{}: {}", photo.filename, e));
                    return false;
                }
            }
        }
        true
    }

    fn step_finalize(
        &self,
        ledger: &Ledger,
        outcome: RouteOutcome,
        skipped: Vec<String>,
    ) -> Result<SortSummary> {
        let mut message = String::new();

        let mut overlapped: Vec<(&String, &Vec<usize>)> = outcome
            .index
            .iter()
            .filter(|(_, orders)| orders.len() > 1)
            .collect();
        overlapped.sort_by(|a, b| a.0.cmp(b.0));
        for (filename, order_indices) in overlapped {
            message.push_str(&format!(
                "The file {filename} was matched by multiple different orders. The following orders matched with the file:\n"
            ));
            for &order_idx in order_indices {
                message.push_str(&format!("\t{}\n", ledger.orders[order_idx]));
            }
        }

        if !skipped.is_empty() {
            message.push_str("The following files were skipped (unexpected filename layout):\n");
            for filename in &skipped {
                message.push_str(&format!("\t{filename}\n"));
            }
        }

        for note in &outcome.conflict_renames {
            message.push_str(&format!("{note}\n"));
        }

        if !outcome.placement_failures.is_empty() {
            message.push_str("The following files could not be placed:\n");
            for failure in &outcome.placement_failures {
                message.push_str(&format!("\t{failure}\n"));
            }
        }

        if !message.is_empty() {
            self.reports.write(
                &ReportWriter::timestamped_name("Orderform_errors", "txt"),
                &message,
            )?;
        }

        if self.config.write_unfulfilled_orders && !outcome.unmatched.is_empty() {
            let mut content = ledger.header_line();
            content.push('\n');
            for &order_idx in &outcome.unmatched {
                content.push_str(&ledger.orders[order_idx].values_for(&ledger.header).join(","));
                content.push('\n');
            }
            self.reports.write(
                &ReportWriter::timestamped_name("Unfulfilled_orders", "csv"),
                &content,
            )?;
        }

        let processed_ledger = write_processed(ledger, &self.config.order_form_path)?;

        let summary = SortSummary {
            files_placed: outcome.placed.len(),
            orders_fulfilled: outcome.orders_fulfilled,
            orders_incomplete: outcome.orders_incomplete,
            skipped_filenames: skipped,
            placement_failures: outcome.placement_failures,
            processed_ledger: Some(processed_ledger),
        };

        info!(
            "Placed {} files; {} orders fulfilled, {} incomplete",
            summary.files_placed, summary.orders_fulfilled, summary.orders_incomplete
        );
        Ok(summary)
    }
}

/// Single entry point for the UI layer: run a whole pass and report how
/// many distinct files were placed (zero is its cue that nothing matched).
pub fn parse_and_process_orders(
    order_form_path: impl Into<PathBuf>,
    source_dir: impl Into<PathBuf>,
    target_dir: impl Into<PathBuf>,
    copy_files: bool,
) -> Result<usize> {
    let mut config = SortConfig::new(order_form_path, source_dir, target_dir);
    config.copy_files = copy_files;
    let summary = BatchRunner::new(config).run()?;
    Ok(summary.files_placed)
}
