// Typed failures of upstream HTTP providers
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("request to {provider} failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} responded with status {status}: {body}")]
    Status {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode {provider} response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

/// Send a prepared request and decode the JSON body, mapping every failure.
pub async fn fetch_json(provider: &'static str, request: reqwest::RequestBuilder) -> Result<serde_json::Value, UpstreamError> {
    let response = request
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|source| UpstreamError::Request { provider, source })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::Status { provider, status, body });
    }

    response
        .json::<serde_json::Value>()
        .await
        .map_err(|source| UpstreamError::Decode { provider, source })
}
