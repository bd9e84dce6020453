use crate::domain::model::{Credentials, TokenGrant};
use crate::domain::ports::TokenExchange;
use crate::utils::error::{ProxyError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

/// Client-credentials exchange against the provider's token endpoint
#[derive(Debug, Clone)]
pub struct HttpTokenExchange {
    client: Client,
    token_url: String,
}

impl HttpTokenExchange {
    pub fn new(client: Client, token_url: impl Into<String>) -> Self {
        Self {
            client,
            token_url: token_url.into(),
        }
    }
}

#[async_trait]
impl TokenExchange for HttpTokenExchange {
    async fn exchange(&self, credentials: &Credentials) -> Result<TokenGrant> {
        let request = TokenRequest {
            grant_type: "client_credentials",
            client_id: &credentials.client_id,
            client_secret: &credentials.client_secret,
        };

        let response = self
            .client
            .post(&self.token_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| ProxyError::AuthError {
                message: format!("token endpoint unreachable: {}", e),
            })?;

        let status = response.status();
        tracing::debug!("Token endpoint response status: {}", status);

        if !status.is_success() {
            // 保留供應商的完整錯誤內容（error 與 error_description）
            let body = response.text().await.unwrap_or_default();
            let body = body.trim();
            let detail = if body.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                body.to_string()
            };
            return Err(ProxyError::AuthError {
                message: format!(
                    "token request failed with status {}: {}",
                    status.as_u16(),
                    detail
                ),
            });
        }

        response.json::<TokenGrant>().await.map_err(|e| ProxyError::AuthError {
            message: format!("malformed token response: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_exchange_posts_form_encoded_credentials() {
        let server = MockServer::start_async().await;
        let token_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/token")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body_contains("grant_type=client_credentials")
                    .body_contains("client_id=my-client")
                    .body_contains("client_secret=my-secret");
                then.status(200)
                    .json_body(serde_json::json!({"access_token": "abc", "expires_in": 3600, "token_type": "Bearer"}));
            })
            .await;

        let exchange = HttpTokenExchange::new(Client::new(), server.url("/token"));
        let grant = exchange
            .exchange(&Credentials::new("my-client", "my-secret"))
            .await
            .unwrap();

        token_mock.assert_async().await;
        assert_eq!(grant.access_token, "abc");
        assert_eq!(grant.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_exchange_failure_wraps_provider_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(401).json_body(serde_json::json!({
                    "error": "invalid_client",
                    "error_description": "Client authentication failed"
                }));
            })
            .await;

        let exchange = HttpTokenExchange::new(Client::new(), server.url("/token"));
        let err = exchange
            .exchange(&Credentials::new("my-client", "my-secret"))
            .await
            .unwrap_err();

        match err {
            ProxyError::AuthError { message } => {
                assert!(message.contains("401"));
                assert!(message.contains("invalid_client"));
                assert!(message.contains("Client authentication failed"));
                assert!(!message.contains("my-secret"));
            }
            other => panic!("expected auth error, got {:?}", other),
        }
    }
}
