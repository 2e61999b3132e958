//! Plain-text issue report, the shareable write-up of a single Report.

use std::fmt::Write;

use crate::geo::maps_link;
use crate::models::Report;

pub fn render_summary(report: &Report) -> String {
    let mut out = String::new();
    let caption = if report.caption.is_empty() { "(no caption)" } else { report.caption.as_str() };

    // Writing to a String cannot fail.
    let _ = writeln!(out, "Caption: {caption}");
    let _ = writeln!(
        out,
        "Location: {}, {}",
        report.location.latitude, report.location.longitude
    );
    let _ = writeln!(out, "View on map: {}", maps_link(&report.location));
    let _ = writeln!(out, "Hashtags: {}", report.hashtags);
    let _ = writeln!(out, "Tags: {}", report.tags);
    let _ = writeln!(out, "Reported by: {}", report.author);
    let _ = writeln!(out, "Submissions: {}", report.count);
    let _ = writeln!(
        out,
        "Engagement: {} impressions, {} likes, {} comments",
        report.impressions, report.likes, report.comments
    );
    let _ = writeln!(out, "First reported: {}", report.timestamp.to_rfc3339());
    if !report.image_reference.is_empty() {
        let _ = writeln!(out, "Photo: {}", report.image_reference);
    }
    out
}
