//! # ReportStore
//!
//! The single owner of the report collection. Callers read snapshots and
//! commit changes only through `submit` and `record_impression`.
//!
//! Each mutation is a read-merge-write cycle run under one async mutex, so
//! two submissions can never both read the pre-merge state and clobber each
//! other's increment. The collection is written back whole under `POSTS_KEY`;
//! when that write fails the previous blob is still what the backend holds.

use std::collections::HashSet;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::aggregator::{rank, Aggregator};
use crate::config::AggregatorConfig;
use crate::error::{AppError, Result};
use crate::export::render_summary;
use crate::models::{Report, SubmitOutcome, Submission};
use crate::traits::KeyValueStore;

/// Key of the serialized collection in the backing store.
pub const POSTS_KEY: &str = "posts";

pub struct ReportStore {
    backend: Box<dyn KeyValueStore>,
    aggregator: Aggregator,
    /// Serialization point for read-modify-write cycles; also owns the RNG
    /// that drives impression noise.
    write_lock: Mutex<StdRng>,
}

impl ReportStore {
    pub fn new(backend: Box<dyn KeyValueStore>, config: AggregatorConfig) -> Result<Self> {
        Self::with_rng(backend, config, StdRng::from_entropy())
    }

    /// Same as `new` with a caller-supplied RNG, for reproducible impressions.
    pub fn with_rng(
        backend: Box<dyn KeyValueStore>,
        config: AggregatorConfig,
        rng: StdRng,
    ) -> Result<Self> {
        Ok(Self {
            backend,
            aggregator: Aggregator::new(config)?,
            write_lock: Mutex::new(rng),
        })
    }

    pub fn config(&self) -> &AggregatorConfig {
        self.aggregator.config()
    }

    async fn load(&self) -> Result<Vec<Report>> {
        let blob = self.backend.get(POSTS_KEY).await.map_err(AppError::persistence)?;
        match blob {
            None => Ok(Vec::new()),
            Some(raw) => decode(&raw),
        }
    }

    async fn save(&self, reports: &[Report]) -> Result<()> {
        let raw = encode(reports)?;
        self.backend.put(POSTS_KEY, &raw).await.map_err(AppError::persistence)
    }

    /// The collection in stored (insertion) order.
    pub async fn snapshot(&self) -> Result<Vec<Report>> {
        self.load().await
    }

    /// The collection ranked for display.
    pub async fn feed(&self) -> Result<Vec<Report>> {
        Ok(rank(&self.load().await?))
    }

    pub async fn get(&self, id: Uuid) -> Result<Report> {
        self.load()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound("Report".into(), id.to_string()))
    }

    /// Plain-text write-up of one report.
    pub async fn summary(&self, id: Uuid) -> Result<String> {
        Ok(render_summary(&self.get(id).await?))
    }

    /// Merges a submission into the stored collection and persists it.
    /// Returns how it landed together with the affected report.
    pub async fn submit(&self, submission: Submission) -> Result<(SubmitOutcome, Report)> {
        // Rejected before anything is read or locked.
        submission.required_fields()?;

        let _guard = self.write_lock.lock().await;
        let current = self.load().await?;
        let (updated, outcome) = self.aggregator.submit(submission, current)?;

        if let Err(e) = self.save(&updated).await {
            warn!("submission not stored: {e}");
            return Err(e);
        }

        let report = updated
            .into_iter()
            .find(|r| r.id == outcome.id())
            .ok_or_else(|| AppError::NotFound("Report".into(), outcome.id().to_string()))?;

        match outcome {
            SubmitOutcome::Created { id } => {
                info!("new report {id} [{}] at {:?}", report.tags, report.location)
            }
            SubmitOutcome::Merged { id, count } => {
                info!("submission merged into report {id} [{}], count now {count}", report.tags)
            }
        }
        Ok((outcome, report))
    }

    /// Applies a view event and returns the ranked feed.
    ///
    /// An id that is not stored is dropped silently: nothing is written and
    /// the feed comes back unchanged. Stored order is left as is; only the
    /// returned view is re-sorted.
    pub async fn record_impression(&self, id: Uuid) -> Result<Vec<Report>> {
        let mut rng = self.write_lock.lock().await;
        let mut reports = self.load().await?;

        match self.aggregator.bump_impressions(id, &mut reports, &mut *rng) {
            Some(total) => {
                self.save(&reports).await?;
                debug!("report {id} impressions now {total}");
            }
            None => debug!("impression for unknown report {id} ignored"),
        }
        Ok(rank(&reports))
    }
}

/// Serializes a collection into the stored blob format.
pub fn encode(reports: &[Report]) -> Result<String> {
    serde_json::to_string(reports)
        .map_err(|e| AppError::Persistence(format!("encoding posts: {e}")))
}

/// Parses the stored blob. A blob holding a report with `count == 0` or two
/// reports sharing an id is corrupt and refused, so it is never written back.
pub fn decode(raw: &str) -> Result<Vec<Report>> {
    let reports: Vec<Report> = serde_json::from_str(raw)
        .map_err(|e| AppError::Persistence(format!("decoding posts: {e}")))?;

    let mut ids = HashSet::with_capacity(reports.len());
    for report in &reports {
        if report.count == 0 {
            return Err(AppError::Persistence(format!(
                "decoding posts: report {} has count 0",
                report.id
            )));
        }
        if !ids.insert(report.id) {
            return Err(AppError::Persistence(format!(
                "decoding posts: report {} stored twice",
                report.id
            )));
        }
    }
    Ok(reports)
}
