/// HTTP endpoint for the rendering layer
///
/// Serves pipeline reports as JSON so a dashboard can draw the curves,
/// heatmap and gauges without touching the object store itself.
///
/// Endpoints:
/// - GET /health - Service health check
/// - GET /stations - Station registry
/// - GET /risk/{station} - Report for the default (latest complete) date
/// - GET /risk/{station}/{YYYY-MM-DD} - Report for a given date

use std::io::Cursor;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use log::{error, info, warn};
use thiserror::Error;

use crate::astro::SunCalculator;
use crate::config::PipelineSettings;
use crate::ingest::vpts::VptsSource;
use crate::pipeline::{default_report_date, run_for_date};
use crate::stations::StationRegistry;

type JsonResponse = tiny_http::Response<Cursor<Vec<u8>>>;

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("failed to start HTTP server on {addr}: {message}")]
    Bind { addr: String, message: String },
}

/// Everything a request handler needs; shared read-only across requests.
pub struct EndpointState {
    pub registry: StationRegistry,
    pub source: Arc<dyn VptsSource>,
    pub sun: Arc<dyn SunCalculator>,
    pub settings: PipelineSettings,
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Health,
    Stations,
    Risk {
        station_id: String,
        date: Option<String>,
    },
    NotFound,
}

/// Maps a request URL (query string ignored) to a route.
pub fn route(url: &str) -> Route {
    let path = url.split('?').next().unwrap_or_default().trim_end_matches('/');
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        ["health"] => Route::Health,
        ["stations"] => Route::Stations,
        ["risk", station] => Route::Risk {
            station_id: station.to_string(),
            date: None,
        },
        ["risk", station, date] => Route::Risk {
            station_id: station.to_string(),
            date: Some(date.to_string()),
        },
        _ => Route::NotFound,
    }
}

/// Produces the status code and JSON body for a URL.
///
/// `today` anchors the default date so the handler stays deterministic.
pub fn handle_request(state: &EndpointState, url: &str, today: NaiveDate) -> (u16, serde_json::Value) {
    match route(url) {
        Route::Health => (
            200,
            serde_json::json!({
                "status": "ok",
                "service": "birdrisk_service",
                "version": env!("CARGO_PKG_VERSION"),
            }),
        ),
        Route::Stations => (
            200,
            serde_json::to_value(&state.registry).unwrap_or_default(),
        ),
        Route::Risk { station_id, date } => handle_risk(state, &station_id, date.as_deref(), today),
        Route::NotFound => (
            404,
            serde_json::json!({
                "error": "Not found",
                "available_endpoints": ["/health", "/stations", "/risk/{station}", "/risk/{station}/{YYYY-MM-DD}"]
            }),
        ),
    }
}

fn handle_risk(
    state: &EndpointState,
    station_id: &str,
    date: Option<&str>,
    today: NaiveDate,
) -> (u16, serde_json::Value) {
    let Some(station) = state.registry.find(station_id) else {
        return (
            404,
            serde_json::json!({
                "error": format!("Station {} not found in registry", station_id),
                "station_id": station_id,
            }),
        );
    };

    let date = match date {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                return (
                    400,
                    serde_json::json!({
                        "error": format!("Invalid date '{}', expected YYYY-MM-DD", raw),
                    }),
                );
            }
        },
        None => default_report_date(today, state.settings.data_latency_days),
    };

    match run_for_date(
        Arc::clone(&state.source),
        state.sun.as_ref(),
        station,
        date,
        &state.settings,
    ) {
        Ok(report) => (200, serde_json::to_value(&report).unwrap_or_default()),
        Err(e) => {
            warn!("Report for {} on {} failed: {}", station.station_id, date, e);
            (
                502,
                serde_json::json!({
                    "error": e.to_string(),
                    "station_id": e.station_id,
                    "date": e.date,
                    "url": e.url,
                }),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Bind on `addr` (e.g. "0.0.0.0:8080") and serve until the process exits
pub fn start_endpoint_server(addr: &str, state: EndpointState) -> Result<(), EndpointError> {
    let server = tiny_http::Server::http(addr).map_err(|e| EndpointError::Bind {
        addr: addr.to_string(),
        message: e.to_string(),
    })?;

    info!("HTTP endpoint listening on http://{}", addr);
    serve(&server, &state);
    Ok(())
}

/// Request loop over an already-bound server.
pub fn serve(server: &tiny_http::Server, state: &EndpointState) {
    for request in server.incoming_requests() {
        let (status, body) = if *request.method() == tiny_http::Method::Get {
            handle_request(state, request.url(), Utc::now().date_naive())
        } else {
            (405, serde_json::json!({ "error": "Method not allowed" }))
        };

        if let Err(e) = request.respond(create_response(status, &body)) {
            error!("Failed to send response: {}", e);
        }
    }
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: &serde_json::Value) -> JsonResponse {
    let body = serde_json::to_string_pretty(json).unwrap_or_else(|_| "{}".to_string());
    let response = tiny_http::Response::from_data(body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(status_code));

    match tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
