pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{credentials_from_env, toml_config::TomlConfig, ProviderConfig};
pub use core::{
    fanout::FanOutFetcher,
    handler::{InboundRequest, RequestHandler},
    token_cache::AccessTokenCache,
};
pub use domain::model::{Credentials, HandlerResponse};
pub use utils::error::{ProxyError, Result};
