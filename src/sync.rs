//! The catalog sync engine.
//!
//! # Run Overview
//!
//! One run pulls every change the source has since the last committed
//! cursor and applies it to the record store:
//!
//! 1. Mode selection: an empty record store means an initial (full export)
//!    run. Otherwise the stored cursor is resumed. A non-empty store without
//!    a cursor falls back to an initial run with a warning, as does a stored
//!    cursor that cannot be read or that the source rejects.
//! 2. Pull loop: fetch one page, stop if it carries nothing, upsert its
//!    items, soft-delete its removed ids, then follow the next-page link.
//! 3. Chain boundary: a page with a resume cursor and no next-page link ends
//!    the chain. The cursor is persisted there and nowhere else.
//!
//! A crash mid-chain therefore replays the whole chain from the previous
//! cursor. Upserts are keyed by external id, so replaying a page leaves the
//! records as they were.
//!
//! # Failure Handling
//!
//! Any source or store error aborts the run. Pages already applied stay
//! applied and the previously committed cursor remains the resume point.
//! Items that fail canonicalization are skipped, counted and logged; the
//! rest of their page is still applied.

use std::fmt;

use checkpoint::CursorStore;
use product_store::{RecordStore, UpsertOutcome};
use serde::Serialize;
use sync_core::{RequestDescriptor, Result, SourceClient, SourcePage, SyncError};
use tracing::{debug, error, info, warn};

/// How a run chose its starting request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// The record store was empty.
    Initial,
    /// Resumed from the stored cursor.
    Incremental,
    /// Records exist but no usable cursor was stored.
    InitialFallback,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Initial => write!(f, "initial"),
            SyncMode::Incremental => write!(f, "incremental"),
            SyncMode::InitialFallback => write!(f, "initial (fallback)"),
        }
    }
}

/// Why the pull loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainReason {
    /// A fetched page carried no items and no deletions.
    EmptyPage,
    /// A page ended the chain with a resume cursor, which was committed.
    ChainBoundary,
    /// A page had neither a next-page link nor a cursor.
    NoContinuation,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub pages: u64,
    pub inserted: u64,
    pub updated: u64,
    pub deleted: u64,
    /// Removed ids that had no local record.
    pub missing_deletions: u64,
    /// Items skipped because they could not be canonicalized.
    pub malformed: u64,
}

impl SyncStats {
    pub fn upserted(&self) -> u64 {
        self.inserted + self.updated
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub mode: SyncMode,
    #[serde(flatten)]
    pub stats: SyncStats,
    /// Cursor persisted by this run, if it reached a chain boundary.
    pub committed_cursor: Option<String>,
    pub drain: DrainReason,
}

/// Pulls from a source into a record store, resuming from a cursor store.
///
/// Runs must not overlap; callers invoke [`SyncEngine::run`] sequentially.
pub struct SyncEngine<S, R, C> {
    source: S,
    records: R,
    cursors: C,
}

impl<S, R, C> SyncEngine<S, R, C>
where
    S: SourceClient,
    R: RecordStore,
    C: CursorStore,
{
    pub fn new(source: S, records: R, cursors: C) -> Self {
        Self {
            source,
            records,
            cursors,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn cursors(&self) -> &C {
        &self.cursors
    }

    /// Run one sync to completion.
    pub async fn run(&self) -> Result<SyncReport> {
        match self.run_inner().await {
            Ok(report) => {
                info!(
                    "Sync finished ({}): {} pages, {} inserted, {} updated, {} deleted, {} malformed skipped",
                    report.mode,
                    report.stats.pages,
                    report.stats.inserted,
                    report.stats.updated,
                    report.stats.deleted,
                    report.stats.malformed
                );
                Ok(report)
            }
            Err(e) => {
                error!("Sync run failed: {e}");
                Err(e)
            }
        }
    }

    /// Decide the run mode and its first request.
    pub async fn select_mode(&self) -> Result<(SyncMode, RequestDescriptor)> {
        if !self.records.exists().await? {
            info!("Record store is empty, performing initial sync");
            return Ok((SyncMode::Initial, self.source.initial_request()));
        }

        let stored = match self.cursors.get().await {
            Ok(stored) => stored,
            Err(SyncError::InvalidCursor(reason)) => {
                warn!("Stored sync cursor is unreadable ({reason}), falling back to initial sync");
                return Ok((SyncMode::InitialFallback, self.source.initial_request()));
            }
            Err(e) => return Err(e),
        };

        let Some(stored) = stored else {
            warn!("Records exist but no sync cursor is stored, falling back to initial sync");
            return Ok((SyncMode::InitialFallback, self.source.initial_request()));
        };

        match self.source.continuation_request(&stored.cursor) {
            Ok(request) => {
                info!(
                    "Performing incremental sync from cursor stored at {}",
                    stored.updated_at
                );
                Ok((SyncMode::Incremental, request))
            }
            Err(SyncError::InvalidCursor(reason)) => {
                warn!("Stored sync cursor is unusable ({reason}), falling back to initial sync");
                Ok((SyncMode::InitialFallback, self.source.initial_request()))
            }
            Err(e) => Err(e),
        }
    }

    async fn run_inner(&self) -> Result<SyncReport> {
        let (mode, mut request) = self.select_mode().await?;
        let mut stats = SyncStats::default();
        let mut committed_cursor = None;

        let drain = loop {
            let page = self.source.fetch_page(&request).await?;
            stats.pages += 1;
            debug!(
                "Page {} ({}): {} new items, {} deletions",
                stats.pages,
                request.kind,
                page.new_items.len(),
                page.deleted_ids.len()
            );

            if page.is_empty() {
                info!("No more items to sync");
                break DrainReason::EmptyPage;
            }

            self.apply_page(&page, &mut stats).await?;

            // A next-page link wins over a cursor on the same page.
            if let Some(next) = page.next_page {
                request = next;
                continue;
            }

            match page.next_cursor.filter(|cursor| !cursor.trim().is_empty()) {
                Some(cursor) => {
                    self.cursors.set(&cursor).await?;
                    info!("Committed sync cursor after {} pages", stats.pages);
                    committed_cursor = Some(cursor);
                    break DrainReason::ChainBoundary;
                }
                None => break DrainReason::NoContinuation,
            }
        };

        Ok(SyncReport {
            mode,
            stats,
            committed_cursor,
            drain,
        })
    }

    /// Apply one page: upserts first, then soft deletes.
    pub async fn apply_page(
        &self,
        page: &SourcePage<S::Item>,
        stats: &mut SyncStats,
    ) -> Result<()> {
        for result in self.source.canonicalize(&page.new_items) {
            let product = match result {
                Ok(product) => product,
                Err(e @ SyncError::MalformedItem { .. }) => {
                    warn!("Skipping {e}");
                    stats.malformed += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match self.records.upsert(&product).await? {
                UpsertOutcome::Inserted => stats.inserted += 1,
                UpsertOutcome::Updated => stats.updated += 1,
            }
        }

        for id in &page.deleted_ids {
            if self.records.mark_deleted(id).await? {
                stats.deleted += 1;
            } else {
                debug!("Deleted entry {id} has no local record");
                stats.missing_deletions += 1;
            }
        }

        Ok(())
    }
}
