// HTTP response utilities for JSON+Brotli encoding
use crate::infrastructure::upstream_error::UpstreamError;
use async_compression::tokio::bufread::BrotliEncoder;
use axum::{
    Json,
    body::Body,
    http::{HeaderMap, HeaderValue, Response, StatusCode, header},
    response::IntoResponse,
};
use serde::Serialize;
use tokio::io::AsyncReadExt;

/// Whether the client advertised Brotli support.
pub fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').any(|enc| enc.trim().split(';').next() == Some("br")))
        .unwrap_or(false)
}

pub async fn brotli_compress(bytes: Vec<u8>) -> std::io::Result<Vec<u8>> {
    let mut encoder = BrotliEncoder::new(std::io::Cursor::new(bytes));
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed).await?;
    Ok(compressed)
}

/// Serialize `data` to JSON, optionally compressed with Brotli.
pub async fn json_response<T: Serialize>(data: &T, compress: bool) -> Result<Response<Body>, ApiError> {
    let json_bytes = serde_json::to_vec(data).map_err(|e| ApiError::Internal(e.into()))?;

    let (body_bytes, content_encoding) = if compress {
        let raw_len = json_bytes.len();
        let compressed = brotli_compress(json_bytes)
            .await
            .map_err(|e| ApiError::Internal(e.into()))?;
        tracing::debug!("Compressed JSON body: {} -> {} bytes", raw_len, compressed.len());
        (compressed, Some("br"))
    } else {
        (json_bytes, None)
    };

    let mut response_builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, HeaderValue::from(body_bytes.len()));

    if let Some(encoding) = content_encoding {
        response_builder = response_builder
            .header(header::CONTENT_ENCODING, encoding)
            .header(header::VARY, "accept-encoding");
    }

    response_builder
        .body(Body::from(body_bytes))
        .map_err(|e| ApiError::Internal(e.into()))
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody { error: msg.clone(), status: None, message: None }),
            ApiError::Internal(err) => match err.downcast_ref::<UpstreamError>() {
                Some(UpstreamError::Status { status, body, .. }) => (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        error: "Upstream API error".to_string(),
                        status: Some(status.as_u16()),
                        message: Some(body.clone()),
                    },
                ),
                Some(upstream) => (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody { error: "Upstream API error".to_string(), status: None, message: Some(upstream.to_string()) },
                ),
                None => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody { error: "Internal error".to_string(), status: None, message: Some(format!("{err:#}")) },
                ),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            tracing::error!("Request failed: {:#}", self);
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_compression::tokio::bufread::BrotliDecoder;

    #[test]
    fn test_accepts_brotli() {
        let mut headers = HeaderMap::new();
        assert!(!accepts_brotli(&headers));

        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br;q=0.9"));
        assert!(accepts_brotli(&headers));

        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip, brotli-ish"));
        assert!(!accepts_brotli(&headers));
    }

    #[tokio::test]
    async fn test_brotli_round_trip() {
        let payload = serde_json::to_vec(&serde_json::json!({"vehicles": vec![1; 200]})).unwrap();
        let compressed = brotli_compress(payload.clone()).await.unwrap();
        assert!(compressed.len() < payload.len());

        let mut decoder = BrotliDecoder::new(std::io::Cursor::new(compressed));
        let mut restored = Vec::new();
        decoder.read_to_end(&mut restored).await.unwrap();
        assert_eq!(restored, payload);
    }

    #[tokio::test]
    async fn test_json_response_headers() {
        let plain = json_response(&serde_json::json!({"ok": true}), false).await.unwrap();
        assert_eq!(plain.headers()[header::CONTENT_TYPE], "application/json");
        assert!(plain.headers().get(header::CONTENT_ENCODING).is_none());

        let compressed = json_response(&serde_json::json!({"ok": true}), true).await.unwrap();
        assert_eq!(compressed.headers()[header::CONTENT_ENCODING], "br");
    }

    #[test]
    fn test_upstream_status_maps_to_bad_gateway() {
        let err = ApiError::from(anyhow::Error::from(UpstreamError::Status {
            provider: "GPS API",
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: "bad credentials".to_string(),
        }));
        let (status, body) = err.status_and_body();

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.status, Some(401));
        assert_eq!(body.message.as_deref(), Some("bad credentials"));
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(ApiError::BadRequest("x".into()).status_and_body().0, StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(anyhow::anyhow!("boom")).status_and_body().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
