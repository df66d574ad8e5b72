//! One-shot paid fetch: `skale-rng-fetch [wordLength]`.
//!
//! Prints the random word as pretty JSON. Exits with status 1 on any failure.

use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use x402_buyer::{BuyerConfig, PaidRandomWordClient, X402Error};

async fn run(arg: Option<String>) -> Result<String, X402Error> {
    let config = BuyerConfig::from_env().map_err(|e| X402Error::ConfigError(e.to_string()))?;
    let client = PaidRandomWordClient::initialize(&config)?;

    // A bare number on the command line is a JSON integer; anything else is a string.
    let word_length = arg.map(|a| serde_json::from_str::<Value>(&a).unwrap_or(Value::String(a)));
    let word = client.random_word_from_json(word_length.as_ref()).await?;
    Ok(serde_json::to_string_pretty(&word)?)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(std::env::args().nth(1)).await {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
