//! Handler result normalization.
//!
//! # Responsibilities
//! - Serialize standard handler outcomes into HTTP responses
//! - Render error responses with the status carried by the error
//! - Mask server-error detail outside development
//!
//! # Design Decisions
//! - Objects and arrays become JSON bodies with 200
//! - A returned string is sent as a plain body
//! - Error bodies are JSON `{ "message": ... }`; client errors keep their
//!   message in every environment, server errors only in development

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::dispatch::handler::{HandlerError, Outcome};

pub fn outcome_response(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Json(value) => (StatusCode::OK, Json(value)).into_response(),
        Outcome::Text(body) => (StatusCode::OK, body).into_response(),
        Outcome::NoContent => StatusCode::NO_CONTENT.into_response(),
    }
}

pub fn handler_error_response(error: &HandlerError, development: bool) -> Response {
    let message = if error.status.is_server_error() && !development {
        "internal server error".to_string()
    } else {
        error.message.clone()
    };
    (error.status, Json(json!({ "message": message }))).into_response()
}

pub fn not_found(path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("no route matched {path}") })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_statuses() {
        assert_eq!(
            outcome_response(Outcome::Json(json!({"ok": true}))).status(),
            StatusCode::OK
        );
        assert_eq!(
            outcome_response(Outcome::Text("hi".into())).status(),
            StatusCode::OK
        );
        assert_eq!(
            outcome_response(Outcome::NoContent).status(),
            StatusCode::NO_CONTENT
        );
    }

    #[test]
    fn test_error_status_carried() {
        let error = HandlerError::new(StatusCode::METHOD_NOT_ALLOWED, "use POST");
        let response = handler_error_response(&error, false);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(not_found("/missing").status(), StatusCode::NOT_FOUND);
    }
}
