pub mod exchange;
pub mod fanout;
pub mod handler;
pub mod merger;
pub mod normalizer;
pub mod token_cache;

pub use crate::domain::model::{MergedResponse, UpstreamEndpointSpec, UpstreamResult};
pub use crate::domain::ports::{Clock, TokenExchange};
pub use crate::utils::error::Result;
