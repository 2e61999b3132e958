//! # Report aggregation
//!
//! Merge-on-write deduplication and engagement ranking. Everything here is
//! pure over an in-memory collection; `ReportStore` wraps it with persistence
//! and serialization.
//!
//! Scan order for merges is ascending stored index: when several stored
//! reports qualify, the one inserted earliest wins.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::config::AggregatorConfig;
use crate::error::Result;
use crate::geo;
use crate::models::{Location, Report, SubmitOutcome, Submission};

pub struct Aggregator {
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Index of the first stored report with the same tag key within the merge radius.
    pub fn find_match(&self, location: &Location, tags: &str, reports: &[Report]) -> Option<usize> {
        reports.iter().position(|r| {
            self.config.tag_match.matches(&r.tags, tags)
                && geo::distance(&r.location, location) <= self.config.merge_radius_m
        })
    }

    /// Folds a submission into the collection.
    ///
    /// On a match only `count` moves; the submission's photo, caption and
    /// hashtags are dropped and the first submission's stay. Otherwise the
    /// submission is appended as a new report with `count = 1`.
    pub fn submit(
        &self,
        submission: Submission,
        mut reports: Vec<Report>,
    ) -> Result<(Vec<Report>, SubmitOutcome)> {
        let (location, tags) = submission.required_fields()?;

        if let Some(idx) = self.find_match(&location, tags, &reports) {
            let existing = &mut reports[idx];
            existing.count = existing.count.saturating_add(1);
            let outcome = SubmitOutcome::Merged { id: existing.id, count: existing.count };
            return Ok((reports, outcome));
        }

        let tags = tags.to_string();
        let report = Report {
            id: Uuid::now_v7(),
            caption: submission.caption,
            author: submission
                .author
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| self.config.default_author.clone()),
            location,
            tags,
            hashtags: submission.hashtags,
            image_reference: submission.image_reference,
            count: 1,
            impressions: 0,
            likes: 0,
            comments: 0,
            timestamp: Utc::now(),
        };
        let outcome = SubmitOutcome::Created { id: report.id };
        reports.push(report);
        Ok((reports, outcome))
    }

    /// Adds a random bump in `[impression_min, impression_max]` to the report's
    /// impressions in place. Returns the new total, or `None` for an unknown id.
    pub fn bump_impressions<R: Rng + ?Sized>(
        &self,
        id: Uuid,
        reports: &mut [Report],
        rng: &mut R,
    ) -> Option<u64> {
        let report = reports.iter_mut().find(|r| r.id == id)?;
        let bump = rng.gen_range(self.config.impression_min..=self.config.impression_max);
        report.impressions = report.impressions.saturating_add(bump);
        Some(report.impressions)
    }

    /// View event: bump impressions, then return the re-ranked collection.
    /// An unknown id leaves the collection as it was.
    pub fn record_impression<R: Rng + ?Sized>(
        &self,
        id: Uuid,
        mut reports: Vec<Report>,
        rng: &mut R,
    ) -> Vec<Report> {
        self.bump_impressions(id, &mut reports, rng);
        rank(&reports)
    }
}

/// Orders by impressions, highest first. The sort is stable, so equal
/// counts keep their prior relative order.
pub fn rank(reports: &[Report]) -> Vec<Report> {
    let mut ranked = reports.to_vec();
    ranked.sort_by(|a, b| b.impressions.cmp(&a.impressions));
    ranked
}
