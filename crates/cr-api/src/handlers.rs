//! # cr-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the ReportStore.

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use cr_core::error::AppError;
use cr_core::models::Submission;
use cr_core::store::ReportStore;
use serde_json::json;
use uuid::Uuid;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub store: ReportStore,
}

/// Maps core failures onto HTTP statuses.
///
/// Validation problems go back to the submitter as corrective messages;
/// storage failures (reads and writes alike) are logged and reported
/// without internals.
fn error_response(err: AppError) -> HttpResponse {
    match err {
        AppError::InvalidReport(msg) => {
            HttpResponse::UnprocessableEntity().json(json!({ "error": msg }))
        }
        AppError::NotFound(kind, id) => {
            HttpResponse::NotFound().json(json!({ "error": format!("{kind} {id} not found") }))
        }
        other => {
            log::error!("request failed: {other}");
            HttpResponse::InternalServerError()
                .json(json!({ "error": "report storage is unavailable, please try again" }))
        }
    }
}

/// Body errors from `web::Json`. A body that parses as JSON but has the wrong
/// shape is a correctable submission, so it gets the same 422 as a missing
/// field; anything else keeps actix's default response.
pub fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        JsonPayloadError::Deserialize(e) => {
            let body = json!({ "error": format!("malformed report: {e}") });
            InternalError::from_response(e, HttpResponse::UnprocessableEntity().json(body)).into()
        }
        other => other.into(),
    }
}

/// Takes a submission from the capture flow and merges it into the collection.
pub async fn submit_report(
    data: web::Data<AppState>,
    body: web::Json<Submission>,
) -> impl Responder {
    match data.store.submit(body.into_inner()).await {
        Ok((outcome, report)) => {
            HttpResponse::Created().json(json!({ "outcome": outcome, "report": report }))
        }
        Err(e) => error_response(e),
    }
}

/// The ranked feed.
pub async fn feed(data: web::Data<AppState>) -> impl Responder {
    match data.store.feed().await {
        Ok(reports) => HttpResponse::Ok().json(reports),
        Err(e) => error_response(e),
    }
}

pub async fn get_report(data: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match data.store.get(path.into_inner()).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => error_response(e),
    }
}

/// View event from the display. Unknown ids still get the feed back.
pub async fn record_impression(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match data.store.record_impression(path.into_inner()).await {
        Ok(reports) => HttpResponse::Ok().json(reports),
        Err(e) => error_response(e),
    }
}

/// Plain-text write-up of a single report, ready to share.
pub async fn report_summary(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match data.store.summary(path.into_inner()).await {
        Ok(text) => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(text),
        Err(e) => error_response(e),
    }
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configure_routes;
    use actix_web::{http::StatusCode, test, App};
    use cr_core::memory::MemoryStore;
    use cr_core::models::Report;
    use cr_core::{AggregatorConfig, KeyValueStore, POSTS_KEY};
    use serde_json::Value;

    fn state() -> web::Data<AppState> {
        let store = ReportStore::new(Box::new(MemoryStore::new()), AggregatorConfig::default())
            .expect("default config is valid");
        web::Data::new(AppState { store })
    }

    fn pothole(lat: f64, lon: f64) -> Value {
        json!({
            "imageReference": "file:///photos/1.jpg",
            "location": { "latitude": lat, "longitude": lon },
            "tags": "potholes",
            "hashtags": "#roads",
            "caption": "Deep one"
        })
    }

    #[actix_web::test]
    async fn test_submit_then_merge() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::post().uri("/reports").set_json(pothole(22.72, 75.85)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["outcome"]["kind"], "created");
        assert_eq!(body["report"]["count"], 1);

        let req = test::TestRequest::post().uri("/reports").set_json(pothole(22.7203, 75.8502)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["outcome"]["kind"], "merged");
        assert_eq!(body["outcome"]["count"], 2);

        let req = test::TestRequest::get().uri("/feed").to_request();
        let feed: Vec<Report> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].count, 2);
    }

    #[actix_web::test]
    async fn test_missing_tags_is_unprocessable() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::post()
            .uri("/reports")
            .set_json(json!({ "location": { "latitude": 22.72, "longitude": 75.85 } }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn test_incomplete_location_is_unprocessable() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        for body in [
            json!({ "location": { "latitude": null, "longitude": 75.85 }, "tags": "potholes" }),
            json!({ "location": { "latitude": 22.72 }, "tags": "potholes" }),
            json!({ "location": { "latitude": "north", "longitude": 75.85 }, "tags": "potholes" }),
        ] {
            let req = test::TestRequest::post().uri("/reports").set_json(body).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
            let body: Value = test::read_body_json(resp).await;
            assert!(body["error"].is_string());
        }

        let req = test::TestRequest::get().uri("/feed").to_request();
        let feed: Vec<Report> = test::call_and_read_body_json(&app, req).await;
        assert!(feed.is_empty());
    }

    #[actix_web::test]
    async fn test_storage_failures_are_server_errors() {
        let backend = MemoryStore::new();
        backend.put(POSTS_KEY, "{not json").await.unwrap();
        let store = ReportStore::new(Box::new(backend), AggregatorConfig::default()).unwrap();
        let data = web::Data::new(AppState { store });
        let app = test::init_service(App::new().app_data(data).configure(configure_routes)).await;

        let req = test::TestRequest::post().uri("/reports").set_json(pothole(22.72, 75.85)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert!(!body["error"].as_str().unwrap().contains("saved"));

        let req = test::TestRequest::get().uri("/feed").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "report storage is unavailable, please try again");
    }

    #[actix_web::test]
    async fn test_impressions_and_summary() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::post().uri("/reports").set_json(pothole(22.72, 75.85)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["report"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post().uri(&format!("/reports/{id}/impressions")).to_request();
        let feed: Vec<Report> = test::call_and_read_body_json(&app, req).await;
        assert!((1..=20).contains(&feed[0].impressions));

        let req = test::TestRequest::get().uri(&format!("/reports/{id}/summary")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let text = test::read_body(resp).await;
        let text = std::str::from_utf8(&text).unwrap();
        assert!(text.contains("Tags: potholes"));
        assert!(text.contains("google.com/maps"));
    }

    #[actix_web::test]
    async fn test_unknown_ids() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;
        let id = Uuid::now_v7();

        let req = test::TestRequest::get().uri(&format!("/reports/{id}")).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post().uri(&format!("/reports/{id}/impressions")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let feed: Vec<Report> = test::read_body_json(resp).await;
        assert!(feed.is_empty());
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(App::new().configure(configure_routes)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}
