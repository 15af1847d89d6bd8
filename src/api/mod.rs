use axum::{
    Json, Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{SimulationConfig, ValidationErrors, parse_payload, validate_simulation};

const APP_DESCRIPTION: &str = "Portfolio Trajectory runs Monte Carlo stock market simulations \
    to provide a realistic range of outcomes for investing and retirement planning. This \
    service validates and normalizes simulation requests before they reach the engine.";

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    message: &'static str,
    description: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ValidateResponse<'a> {
    config: &'a SimulationConfig,
}

#[derive(Debug, Serialize)]
struct ErrorListResponse<'a> {
    errors: &'a ValidationErrors,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/api/validate", post(validate_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "portfolio trajectory API listening");

    axum::serve(listener, router()).await
}

async fn root_handler() -> Response {
    json_response(
        StatusCode::OK,
        StatusResponse {
            status: "ok",
            message: "Welcome to Portfolio Trajectory API!",
            description: APP_DESCRIPTION,
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

/// Takes the raw body so malformed JSON is reported in the same error-list
/// shape as validation failures.
async fn validate_handler(body: String) -> Response {
    let raw = match parse_payload(&body) {
        Ok(raw) => raw,
        Err(error) => {
            warn!(%error, "rejected unparseable simulation request");
            let errors = ValidationErrors::from(error);
            return json_response(StatusCode::BAD_REQUEST, ErrorListResponse { errors: &errors });
        }
    };

    match validate_simulation(&raw) {
        Ok(config) => json_response(StatusCode::OK, ValidateResponse { config: &config }),
        Err(errors) => {
            warn!(count = errors.len(), %errors, "rejected invalid simulation request");
            json_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorListResponse { errors: &errors },
            )
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
