//! # Domain Models
//!
//! These structs represent the core entities of civic-report.
//! We use UUID v7 for time-ordered, globally unique identification.
//! Field names serialize in camelCase to match the stored `"posts"` blob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Rejects NaN/infinite values and coordinates off the globe.
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AppError::InvalidReport(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AppError::InvalidReport(format!(
                "longitude {} outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// A persisted civic issue. One or more submissions about the same
/// category at the same approximate spot collapse into a single Report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    #[serde(alias = "title", default)]
    pub caption: String,
    pub author: String,
    pub location: Location,
    /// Category label; the equality key for merges.
    pub tags: String,
    #[serde(default)]
    pub hashtags: String,
    /// Opaque locator of the photo taken with the first submission
    #[serde(default)]
    pub image_reference: String,
    /// Number of submissions merged into this report, always >= 1.
    pub count: u64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    /// Creation time of the first submission
    pub timestamp: DateTime<Utc>,
}

/// Location as sent by the capture flow. Either coordinate may be absent or
/// null; `Submission::required_fields` turns that into `InvalidReport`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmittedLocation {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl From<Location> for SubmittedLocation {
    fn from(l: Location) -> Self {
        Self { latitude: Some(l.latitude), longitude: Some(l.longitude) }
    }
}

/// What the capture flow hands over after the user fills in the form.
///
/// `location`, its coordinates and `tags` are optional here so a missing
/// field surfaces as `InvalidReport` instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub image_reference: String,
    pub location: Option<SubmittedLocation>,
    pub tags: Option<String>,
    #[serde(default)]
    pub hashtags: String,
    #[serde(alias = "title", default)]
    pub caption: String,
    #[serde(default)]
    pub author: Option<String>,
}

impl Submission {
    /// Returns the required fields, or `InvalidReport` naming the first one missing.
    pub fn required_fields(&self) -> Result<(Location, &str)> {
        let submitted = self
            .location
            .ok_or_else(|| AppError::InvalidReport("location is required".into()))?;
        let location = match (submitted.latitude, submitted.longitude) {
            (Some(latitude), Some(longitude)) => Location::new(latitude, longitude),
            (None, _) => return Err(AppError::InvalidReport("location latitude is required".into())),
            (_, None) => return Err(AppError::InvalidReport("location longitude is required".into())),
        };
        location.validate()?;

        let tags = match self.tags.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(AppError::InvalidReport("tags are required".into())),
        };
        Ok((location, tags))
    }
}

/// How a submission landed in the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// No nearby report shared the category; a new one was stored.
    Created { id: Uuid },
    /// An existing report absorbed the submission.
    Merged { id: Uuid, count: u64 },
}

impl SubmitOutcome {
    pub fn id(&self) -> Uuid {
        match self {
            SubmitOutcome::Created { id } | SubmitOutcome::Merged { id, .. } => *id,
        }
    }
}
