//! # cr-api
//!
//! The web routing and orchestration layer for civic-report.

pub mod handlers;
pub mod middleware;

use actix_web::web;

/// Configures the routes for the report feed, plus the JSON body handling
/// that turns malformed submissions into 422s.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handlers::json_error));
    cfg.service(
        web::scope("")
            .route("/health", web::get().to(handlers::health))
            // Ranked feed for the display layer
            .route("/feed", web::get().to(handlers::feed))
            // Submissions from the capture flow
            .route("/reports", web::post().to(handlers::submit_report))
            .route("/reports/{id}", web::get().to(handlers::get_report))
            .route("/reports/{id}/impressions", web::post().to(handlers::record_impression))
            .route("/reports/{id}/summary", web::get().to(handlers::report_summary)),
    );
}
