use kundli_proxy::utils::logger;
use kundli_proxy::utils::validation::Validate;
use kundli_proxy::{
    credentials_from_env, InboundRequest, ProviderConfig, RequestHandler, TomlConfig,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// API-gateway style invocation event
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default, alias = "rawQuery")]
    pub raw_query_string: Option<String>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl From<Request> for InboundRequest {
    fn from(request: Request) -> Self {
        InboundRequest {
            raw_query: request.raw_query_string,
            query_parameters: request.query_string_parameters,
            body: request.body,
        }
    }
}

async fn function_handler(
    handler: &RequestHandler,
    event: LambdaEvent<Request>,
) -> Result<Response, Error> {
    tracing::info!("Handling birth chart request {}", event.context.request_id);

    let request = InboundRequest::from(event.payload);
    let response = handler.handle(&request).await;

    let headers = HashMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
    ]);

    Ok(Response {
        status_code: response.status_code,
        headers,
        body: serde_json::to_string(&response.body)?,
    })
}

fn load_provider_config() -> kundli_proxy::Result<ProviderConfig> {
    match std::env::var("KUNDLI_PROXY_CONFIG") {
        Ok(path) => TomlConfig::from_file(path)?.into_provider_config(),
        Err(_) => {
            let config = ProviderConfig::from_env()?;
            config.validate()?;
            Ok(config)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let provider = load_provider_config()?;

    // 缺少 credentials 不中止啟動，每個請求回 500
    let credentials = match credentials_from_env() {
        Ok(credentials) => Some(credentials),
        Err(e) => {
            tracing::error!("❌ {}", e);
            None
        }
    };

    // 同一個 handler（與 token cache）在每次 invocation 間共用
    let handler = Arc::new(RequestHandler::from_config(&provider, credentials)?);

    run(service_fn(move |event: LambdaEvent<Request>| {
        let handler = handler.clone();
        async move { function_handler(&handler, event).await }
    }))
    .await
}
