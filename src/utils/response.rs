//! Unified response building utilities.
//!
//! This module provides a consistent interface for building redirect, JSON
//! and error responses across different parts of the layer.

use http::{header, HeaderValue, Response, StatusCode};
use serde::Serialize;

/// Standard content types
pub mod content_type {
    pub const TEXT_PLAIN: &str = "text/plain";
    pub const APPLICATION_JSON: &str = "application/json";
}

/// Unified response builder
pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Build a redirect response to `location` with the given status code
    pub fn redirect(location: &str, status: StatusCode) -> Response<Vec<u8>> {
        let location_value = match HeaderValue::from_str(location) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Invalid redirect location '{location}': {e}");
                return Self::error_http(StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect");
            }
        };

        Response::builder()
            .status(status)
            .header(header::LOCATION, location_value)
            .header(header::CONTENT_LENGTH, 0)
            .body(Vec::new())
            .unwrap_or_else(|e| {
                log::error!("Failed to build redirect response: {e}");
                Self::error_http(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            })
    }

    /// Build a JSON response with a `Content-Length` matching the body
    pub fn json<T: Serialize>(data: &T) -> Response<Vec<u8>> {
        match serde_json::to_vec(data) {
            Ok(json_body) => Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type::APPLICATION_JSON)
                .header(header::CONTENT_LENGTH, json_body.len())
                .body(json_body)
                .unwrap_or_else(|e| {
                    log::error!("Failed to build JSON response: {e}");
                    Self::error_http(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                }),
            Err(e) => {
                log::error!("Failed to serialize JSON response: {e}");
                Self::error_http(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "JSON serialization failed",
                )
            }
        }
    }

    /// Build a plain-text error response
    pub fn error_http(status: StatusCode, message: &str) -> Response<Vec<u8>> {
        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, content_type::TEXT_PLAIN)
            .header(header::CONTENT_LENGTH, message.len())
            .body(message.as_bytes().to_vec())
            .unwrap_or_else(|e| {
                log::error!("Failed to build error response: {e}");
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(b"Internal Server Error".to_vec())
                    .unwrap()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_response() {
        let response = ResponseBuilder::redirect("/dashboard", StatusCode::FOUND);
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/dashboard"
        );
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_json_response() {
        use serde_json::json;
        let data = json!({"success": 1, "searchResults": "<ul></ul>"});
        let response = ResponseBuilder::json(&data);
        assert_eq!(response.status(), StatusCode::OK);

        let content_length: usize = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .unwrap()
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(content_length, response.body().len());
    }

    #[test]
    fn test_error_response() {
        let response = ResponseBuilder::error_http(StatusCode::BAD_REQUEST, "Invalid input");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.body(), b"Invalid input");
    }
}
