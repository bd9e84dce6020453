use crate::domain::model::{Credentials, TokenGrant};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Wall clock in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Trades client credentials for a bearer token
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange(&self, credentials: &Credentials) -> Result<TokenGrant>;
}
