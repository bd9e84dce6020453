// Concurrent authenticated GETs against the provider's resource endpoints.
//
// Every call runs to completion before results are returned. A failing endpoint never
// cancels its siblings, so the caller sees all outcomes at once.

use crate::domain::model::{UpstreamEndpointSpec, UpstreamPayload, UpstreamResult};
use futures::future::join_all;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FanOutFetcher {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl FanOutFetcher {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Results come back in the same order as `endpoints`.
    pub async fn fetch_all(
        &self,
        endpoints: &[UpstreamEndpointSpec],
        query: &str,
        token: &str,
    ) -> Vec<UpstreamResult> {
        let calls = endpoints
            .iter()
            .map(|endpoint| self.fetch_one(endpoint, query, token));

        join_all(calls).await
    }

    async fn fetch_one(
        &self,
        endpoint: &UpstreamEndpointSpec,
        query: &str,
        token: &str,
    ) -> UpstreamResult {
        let url = format!("{}{}?{}", self.base_url, endpoint.path_template, query);
        tracing::debug!("📡 {}: GET {}", endpoint.name, url);

        let mut request = self.client.get(&url).bearer_auth(token);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let message = if e.is_timeout() {
                    format!("{} request timed out", endpoint.name)
                } else {
                    format!("{} request could not be sent: {}", endpoint.name, e)
                };
                tracing::warn!("📡 {}: {}", endpoint.name, message);
                return failure(endpoint, None, UpstreamPayload::Empty, message);
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let message = format!("{} response body could not be read: {}", endpoint.name, e);
                tracing::warn!("📡 {}: {}", endpoint.name, message);
                return failure(endpoint, Some(status.as_u16()), UpstreamPayload::Empty, message);
            }
        };

        let payload = parse_payload(&body);

        if !status.is_success() {
            let message = format!(
                "{} request failed with status {}: {}",
                endpoint.name,
                status.as_u16(),
                extract_error_detail(&body, status.as_u16())
            );
            tracing::warn!("📡 {}: {}", endpoint.name, message);
            return failure(endpoint, Some(status.as_u16()), payload, message);
        }

        tracing::info!("📡 {}: {} ({} bytes)", endpoint.name, status, body.len());
        UpstreamResult {
            endpoint_name: endpoint.name.to_string(),
            ok: true,
            status_code: Some(status.as_u16()),
            payload,
            error_message: None,
        }
    }
}

fn failure(
    endpoint: &UpstreamEndpointSpec,
    status_code: Option<u16>,
    payload: UpstreamPayload,
    message: String,
) -> UpstreamResult {
    UpstreamResult {
        endpoint_name: endpoint.name.to_string(),
        ok: false,
        status_code,
        payload,
        error_message: Some(message),
    }
}

fn parse_payload(body: &str) -> UpstreamPayload {
    if body.trim().is_empty() {
        return UpstreamPayload::Empty;
    }
    match serde_json::from_str(body) {
        Ok(value) => UpstreamPayload::Json(value),
        Err(_) => UpstreamPayload::Text(body.to_string()),
    }
}

/// 從錯誤回應中取出可讀的訊息；無法解析時回傳原始內容
pub fn extract_error_detail(body: &str, status: u16) -> String {
    if body.trim().is_empty() {
        return format!("HTTP {}", status);
    }

    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };

    let first_error = json.get("errors").and_then(|errors| errors.get(0));
    let candidates = [
        first_error.and_then(|e| e.get("detail")),
        first_error.and_then(|e| e.get("title")),
        json.get("message"),
        json.get("error_description"),
        json.get("error"),
    ];

    let detail = candidates
        .into_iter()
        .flatten()
        .find_map(|value| value.as_str().map(str::to_string));
    detail.unwrap_or_else(|| body.to_string())
}
