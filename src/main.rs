use clap::Parser;
use kundli_proxy::utils::logger;
use kundli_proxy::utils::validation::Validate;
use kundli_proxy::{credentials_from_env, CliConfig, ProviderConfig, RequestHandler, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting kundli-proxy CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let provider = match &config.config {
        Some(path) => TomlConfig::from_file(path)?.into_provider_config(),
        None => ProviderConfig::from_env().and_then(|c| c.validate().map(|_| c)),
    };
    let provider = match provider {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    // 缺少 credentials 時交給 handler 回 500
    let credentials = match credentials_from_env() {
        Ok(credentials) => Some(credentials),
        Err(e) => {
            tracing::warn!("⚠️ {}", e);
            None
        }
    };

    let handler = RequestHandler::from_config(&provider, credentials)?;
    let response = handler.handle(&config.to_request()).await;

    println!("{}", serde_json::to_string_pretty(&response.body)?);

    let exit_code = match response.status_code {
        200 => 0,
        400 => 2,
        _ => 1,
    };
    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
