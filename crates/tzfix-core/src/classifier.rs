use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::asset::Asset;
use crate::catalog::Catalog;
use crate::decision::{Decision, PendingUpdate};

pub const DEFAULT_LOG_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Decide everything, report pending corrections as updated, write nothing.
    #[default]
    DryRun,
    /// Send each pending correction to the catalog.
    Live,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::DryRun => f.write_str("DRY RUN"),
            DispatchMode::Live => f.write_str("LIVE MODE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Updated,
    AlreadyCorrect,
    Skipped,
    Error,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Updated => "Updated",
            Outcome::AlreadyCorrect => "Already correct",
            Outcome::Skipped => "Skipped",
            Outcome::Error => "Error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub updated: usize,
    pub already_correct: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Updated => self.updated += 1,
            Outcome::AlreadyCorrect => self.already_correct += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Error => self.errors += 1,
        }
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Updated => self.updated,
            Outcome::AlreadyCorrect => self.already_correct,
            Outcome::Skipped => self.skipped,
            Outcome::Error => self.errors,
        }
    }

    pub fn total(&self) -> usize {
        self.updated + self.already_correct + self.skipped + self.errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub asset_id: Uuid,
    pub file_name: String,
    pub outcome: Outcome,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.outcome, self.file_name, self.message)
    }
}

/// Fixed-capacity FIFO of the most recent log entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailingLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl TrailingLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }
}

impl Default for TrailingLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub mode: DispatchMode,
    pub tally: Tally,
    pub log: TrailingLog,
}

/// Turns per-asset decisions into outcomes, dispatching updates in live mode.
#[derive(Debug)]
pub struct BatchClassifier {
    mode: DispatchMode,
    tally: Tally,
    log: TrailingLog,
}

impl BatchClassifier {
    pub fn new(mode: DispatchMode, log_capacity: usize) -> Self {
        Self {
            mode,
            tally: Tally::default(),
            log: TrailingLog::new(log_capacity),
        }
    }

    /// Classifies one asset. Dispatch failures are recorded as `Error` and
    /// never propagate.
    pub async fn classify(
        &mut self,
        asset: &Asset,
        decision: Decision,
        catalog: &dyn Catalog,
    ) -> Outcome {
        let (outcome, message) = match decision {
            Decision::Skip(reason) => {
                debug!(asset_id = %asset.id, file = %asset.original_file_name, %reason, "skipping asset");
                (Outcome::Skipped, reason.to_string())
            }
            Decision::AlreadyCorrect { time_zone } => {
                debug!(asset_id = %asset.id, file = %asset.original_file_name, %time_zone, "already correct");
                (Outcome::AlreadyCorrect, time_zone)
            }
            Decision::Fail(err) => {
                warn!(asset_id = %asset.id, file = %asset.original_file_name, error = %err, "cannot decide timezone");
                (Outcome::Error, err.to_string())
            }
            Decision::Pending(pending) => self.dispatch(asset, &pending, catalog).await,
        };

        self.tally.record(outcome);
        self.log.push(LogEntry {
            asset_id: asset.id,
            file_name: asset.original_file_name.clone(),
            outcome,
            message,
        });
        outcome
    }

    async fn dispatch(
        &self,
        asset: &Asset,
        pending: &PendingUpdate,
        catalog: &dyn Catalog,
    ) -> (Outcome, String) {
        let change = format!(
            "{} -> {} via {}",
            pending.previous_time_zone.as_deref().unwrap_or("None"),
            pending.time_zone_name(),
            pending.source
        );

        match self.mode {
            DispatchMode::DryRun => {
                info!(asset_id = %asset.id, file = %asset.original_file_name, %change, "would update (dry run)");
                (Outcome::Updated, format!("{change} (dry run)"))
            }
            DispatchMode::Live => {
                let update = pending.to_update();
                match catalog.update_asset(pending.asset_id, &update).await {
                    Ok(()) => {
                        info!(
                            asset_id = %asset.id,
                            file = %asset.original_file_name,
                            %change,
                            date_time_original = %update.date_time_original,
                            "updated asset"
                        );
                        (Outcome::Updated, change)
                    }
                    Err(err) => {
                        warn!(asset_id = %asset.id, file = %asset.original_file_name, error = %err, "update failed");
                        (Outcome::Error, format!("API {err}"))
                    }
                }
            }
        }
    }

    pub fn finish(self) -> BatchSummary {
        BatchSummary {
            mode: self.mode,
            tally: self.tally,
            log: self.log,
        }
    }
}
