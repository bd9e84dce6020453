use serde::{Deserialize, Serialize};
use std::fmt;

/// OAuth2 client-credentials pair for the astrology provider
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

// 避免 secret 出現在日誌中
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub value: String,
    pub expires_at_epoch_millis: i64,
}

/// Birth details as sent by the browser form (JSON body variant)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BirthQuery {
    pub datetime: String,
    pub coordinates: String,
    #[serde(default = "default_ayanamsa")]
    pub ayanamsa: i64,
    #[serde(default)]
    pub timezone: Option<String>,
}

pub fn default_ayanamsa() -> i64 {
    1
}

impl BirthQuery {
    /// 組成原始 query string，交給 normalizer 處理
    pub fn to_raw_query(&self) -> String {
        format!(
            "datetime={}&coordinates={}&ayanamsa={}",
            self.datetime, self.coordinates, self.ayanamsa
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamEndpointSpec {
    pub name: &'static str,
    pub path_template: &'static str,
}

pub const KUNDLI: &str = "kundli";
pub const DASHA: &str = "dasha";
pub const PLANET_POSITION: &str = "planet-position";

/// Resources fetched for every birth-chart request, in declaration order.
pub const BIRTH_CHART_ENDPOINTS: [UpstreamEndpointSpec; 3] = [
    UpstreamEndpointSpec {
        name: KUNDLI,
        path_template: "/v2/astrology/kundli",
    },
    UpstreamEndpointSpec {
        name: DASHA,
        path_template: "/v2/astrology/dasha-periods",
    },
    UpstreamEndpointSpec {
        name: PLANET_POSITION,
        path_template: "/v2/astrology/planet-position",
    },
];

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamPayload {
    Json(serde_json::Value),
    Text(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResult {
    pub endpoint_name: String,
    pub ok: bool,
    /// `None` when no HTTP response was received
    pub status_code: Option<u16>,
    pub payload: UpstreamPayload,
    /// Human-readable failure detail, set when `ok` is false
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MergedResponse {
    pub kundli_data: serde_json::Value,
    pub dasha_data: serde_json::Value,
}

/// Status code plus JSON body handed back to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: serde_json::Value,
}

impl HandlerResponse {
    pub fn ok(body: serde_json::Value) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }

    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            body: serde_json::json!({ "error": message.into() }),
        }
    }
}
