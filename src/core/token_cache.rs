// Bearer token cache for the provider's client-credentials grant.
//
// A token is reused until it is within `safety_margin` of expiring, so request volume is
// decoupled from token-exchange volume. The cache lives for the process lifetime only.

use crate::domain::model::{CachedToken, Credentials};
use crate::domain::ports::{Clock, SystemClock, TokenExchange};
use crate::utils::error::Result;
use std::time::Duration;
use tokio::sync::RwLock;

pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(300);

pub struct AccessTokenCache<E: TokenExchange, C: Clock = SystemClock> {
    exchange: E,
    clock: C,
    safety_margin: Duration,
    cached: RwLock<Option<CachedToken>>,
}

impl<E: TokenExchange> AccessTokenCache<E, SystemClock> {
    pub fn new(exchange: E) -> Self {
        Self::with_clock(exchange, SystemClock)
    }
}

impl<E: TokenExchange, C: Clock> AccessTokenCache<E, C> {
    pub fn with_clock(exchange: E, clock: C) -> Self {
        Self {
            exchange,
            clock,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            cached: RwLock::new(None),
        }
    }

    pub fn with_safety_margin(mut self, safety_margin: Duration) -> Self {
        self.safety_margin = safety_margin;
        self
    }

    /// 取得有效的 token，必要時重新交換
    pub async fn get_token(&self, credentials: &Credentials) -> Result<String> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref().filter(|t| self.is_fresh(t)) {
                tracing::debug!("🔑 Using cached access token");
                return Ok(token.value.clone());
            }
        }

        let mut cached = self.cached.write().await;

        // 等待寫鎖期間可能已有其他請求完成更新
        if let Some(token) = cached.as_ref().filter(|t| self.is_fresh(t)) {
            return Ok(token.value.clone());
        }

        tracing::info!("🔑 Requesting new access token");
        let grant = self.exchange.exchange(credentials).await?;

        let lifetime_millis = i64::try_from(grant.expires_in.saturating_mul(1000)).unwrap_or(i64::MAX);
        let token = CachedToken {
            value: grant.access_token,
            expires_at_epoch_millis: self.clock.now_millis().saturating_add(lifetime_millis),
        };
        tracing::debug!("🔑 Access token valid for {}s", grant.expires_in);

        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Drops the cached token so the next call performs an exchange
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    pub async fn cached_token(&self) -> Option<CachedToken> {
        self.cached.read().await.clone()
    }

    fn is_fresh(&self, token: &CachedToken) -> bool {
        let margin = self.safety_margin.as_millis() as i64;
        token.expires_at_epoch_millis - self.clock.now_millis() > margin
    }
}
