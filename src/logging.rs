//! Middleware for logging requests and responses.

use axum::{extract::Request, middleware::Next, response::Response};

/// The maximum body length logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The JSON fields whose values must never appear in logs.
const SECRET_FIELDS: [&str; 2] = ["access_token", "public_token"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body logged at the `debug` level. Aggregator credentials in
/// JSON request bodies are redacted before logging.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body_text) = extract_parts_and_body_text_from_request(request).await;

    log_request(&parts, &redact_secrets(&body_text));

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body_text) = extract_parts_and_body_text_from_response(response).await;
    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

/// Replace the values of credential fields in a JSON body with asterisks.
///
/// Bodies that are not JSON objects are returned unchanged.
fn redact_secrets(body_text: &str) -> String {
    let Ok(mut value) = serde_json::from_str::<serde_json::Value>(body_text) else {
        return body_text.to_owned();
    };

    let Some(object) = value.as_object_mut() else {
        return body_text.to_owned();
    };

    for field in SECRET_FIELDS {
        if let Some(entry) = object.get_mut(field) {
            *entry = serde_json::Value::String("********".to_owned());
        }
    }

    value.to_string()
}

async fn extract_parts_and_body_text_from_request(
    request: Request,
) -> (axum::http::request::Parts, String) {
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn extract_parts_and_body_text_from_response(
    response: Response,
) -> (axum::http::response::Parts, String) {
    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {} {}\nbody: {}...",
            parts.method,
            parts.uri,
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {} {}\nbody: {body:?}", parts.method, parts.uri);
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {}\nbody: {}...",
            parts.status,
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {}\nbody: {body:?}", parts.status);
    }
}

#[cfg(test)]
mod redact_secrets_tests {
    use super::redact_secrets;

    #[test]
    fn access_token_is_redacted() {
        let body = r#"{"access_token":"token_abc","enrollment_id":"enr_1"}"#;

        let redacted = redact_secrets(body);

        assert!(!redacted.contains("token_abc"));
        assert!(redacted.contains("enr_1"));
        assert!(redacted.contains("********"));
    }

    #[test]
    fn public_token_is_redacted() {
        let redacted = redact_secrets(r#"{"public_token":"public_xyz"}"#);

        assert!(!redacted.contains("public_xyz"));
    }

    #[test]
    fn non_json_body_is_unchanged() {
        assert_eq!(redact_secrets("plain text"), "plain text");
    }

    #[test]
    fn truncation_limit_redacts_before_cutting() {
        // A long token would otherwise leak into the truncated info line.
        let body = format!(r#"{{"access_token":"{}"}}"#, "a".repeat(100));

        let redacted = redact_secrets(&body);

        assert!(!redacted.contains("aaaa"));
    }
}
