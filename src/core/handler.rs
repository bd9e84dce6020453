// Request orchestration: validate, repair the query, authenticate, fan out, merge.

use crate::config::ProviderConfig;
use crate::core::exchange::HttpTokenExchange;
use crate::core::fanout::FanOutFetcher;
use crate::core::merger::merge;
use crate::core::normalizer::normalize;
use crate::core::token_cache::AccessTokenCache;
use crate::domain::model::{
    BirthQuery, Credentials, HandlerResponse, MergedResponse, UpstreamEndpointSpec,
    BIRTH_CHART_ENDPOINTS,
};
use crate::domain::ports::{Clock, SystemClock, TokenExchange};
use crate::utils::error::{ProxyError, Result};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Inbound request as delivered by the hosting platform
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    pub raw_query: Option<String>,
    /// Already-decoded query parameters, used when no raw query string is available
    pub query_parameters: Option<HashMap<String, String>>,
    /// JSON body with `datetime`/`coordinates`
    pub body: Option<String>,
}

impl InboundRequest {
    pub fn from_query(raw_query: impl Into<String>) -> Self {
        Self {
            raw_query: Some(raw_query.into()),
            ..Default::default()
        }
    }

    /// 依序嘗試 raw query、解碼後的參數、JSON body
    pub fn resolve_raw_query(&self) -> Result<String> {
        if let Some(raw) = self.raw_query.as_deref().filter(|q| !q.trim().is_empty()) {
            return Ok(raw.to_string());
        }

        if let Some(params) = self.query_parameters.as_ref().filter(|p| !p.is_empty()) {
            let mut pairs: Vec<_> = params.iter().collect();
            pairs.sort();
            return Ok(pairs
                .into_iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect::<Vec<_>>()
                .join("&"));
        }

        if let Some(body) = self.body.as_deref().filter(|b| !b.trim().is_empty()) {
            let query: BirthQuery = serde_json::from_str(body)
                .map_err(|e| ProxyError::validation(format!("invalid request body: {}", e)))?;
            return Ok(query.to_raw_query());
        }

        Err(ProxyError::validation("missing query string"))
    }
}

pub struct RequestHandler<E: TokenExchange = HttpTokenExchange, C: Clock = SystemClock> {
    credentials: Option<Credentials>,
    token_cache: AccessTokenCache<E, C>,
    fetcher: FanOutFetcher,
    endpoints: Vec<UpstreamEndpointSpec>,
}

impl RequestHandler {
    /// 以設定建立 handler；credentials 缺少時仍可建立，但每個請求都會回 500
    pub fn from_config(config: &ProviderConfig, credentials: Option<Credentials>) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_seconds);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let token_cache =
            AccessTokenCache::new(HttpTokenExchange::new(client.clone(), &config.token_url))
                .with_safety_margin(Duration::from_secs(config.token_safety_margin_seconds));
        let fetcher = FanOutFetcher::new(client, &config.api_base_url).with_timeout(timeout);

        Ok(Self::new(credentials, token_cache, fetcher))
    }
}

impl<E: TokenExchange, C: Clock> RequestHandler<E, C> {
    pub fn new(
        credentials: Option<Credentials>,
        token_cache: AccessTokenCache<E, C>,
        fetcher: FanOutFetcher,
    ) -> Self {
        Self {
            credentials,
            token_cache,
            fetcher,
            endpoints: BIRTH_CHART_ENDPOINTS.to_vec(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: Vec<UpstreamEndpointSpec>) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn token_cache(&self) -> &AccessTokenCache<E, C> {
        &self.token_cache
    }

    /// Always returns a JSON body holding either the merged result or a single `error` field.
    pub async fn handle(&self, request: &InboundRequest) -> HandlerResponse {
        let started = Instant::now();

        let response = match self.process(request).await {
            Ok(merged) => match serde_json::to_value(&merged) {
                Ok(body) => HandlerResponse::ok(body),
                Err(e) => HandlerResponse::error(500, ProxyError::from(e).to_string()),
            },
            Err(e) => {
                let status = e.status_code();
                if status >= 500 {
                    tracing::error!("❌ Request failed: {}", e);
                } else {
                    tracing::warn!("⚠️ Rejected request: {}", e);
                }
                HandlerResponse::error(status, e.to_string())
            }
        };

        tracing::info!(
            "✅ Responded {} in {:?}",
            response.status_code,
            started.elapsed()
        );
        response
    }

    async fn process(&self, request: &InboundRequest) -> Result<MergedResponse> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| ProxyError::ConfigError {
                message: "API credentials are not configured".to_string(),
            })?;

        let raw_query = request.resolve_raw_query()?;
        let query = normalize(&raw_query)?;

        let token = self.token_cache.get_token(credentials).await?;

        tracing::debug!("📡 Fetching {} endpoints", self.endpoints.len());
        let results = self.fetcher.fetch_all(&self.endpoints, &query, &token).await;

        merge(&results)
    }
}
