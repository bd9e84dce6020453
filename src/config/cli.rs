use crate::core::handler::InboundRequest;
use crate::domain::model::{default_ayanamsa, BirthQuery};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "kundli-proxy")]
#[command(about = "Fetches a merged birth chart from the astrology provider")]
pub struct CliConfig {
    /// Raw query string, e.g. "datetime=...&coordinates=...&ayanamsa=1"
    #[arg(long, conflicts_with_all = ["datetime", "coordinates"])]
    pub query: Option<String>,

    #[arg(long, requires = "coordinates")]
    pub datetime: Option<String>,

    #[arg(long, requires = "datetime", allow_hyphen_values = true)]
    pub coordinates: Option<String>,

    #[arg(long, default_value_t = default_ayanamsa())]
    pub ayanamsa: i64,

    #[arg(long, help = "TOML file with a [provider] table")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn to_request(&self) -> InboundRequest {
        if let Some(query) = &self.query {
            return InboundRequest::from_query(query.clone());
        }

        match (&self.datetime, &self.coordinates) {
            (Some(datetime), Some(coordinates)) => InboundRequest::from_query(
                BirthQuery {
                    datetime: datetime.clone(),
                    coordinates: coordinates.clone(),
                    ayanamsa: self.ayanamsa,
                    timezone: None,
                }
                .to_raw_query(),
            ),
            _ => InboundRequest::default(),
        }
    }
}
