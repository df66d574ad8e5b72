use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use x402_buyer::{
    api, BuyerConfig, ExactEvmSchemeClient, PaidRandomWordClient, PaymentTransport,
    ReqwestTransport,
};

type PaidTransport = PaymentTransport<ReqwestTransport, ExactEvmSchemeClient>;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match BuyerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "configuration loaded");

    let client = match PaidRandomWordClient::initialize(&config) {
        Ok(client) => web::Data::new(client),
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize client");
            std::process::exit(1);
        }
    };

    let port = config.port;
    tracing::info!("SKALE RNG buyer listening at http://localhost:{port}");
    tracing::info!("Endpoints: POST /api/random-word, GET /health");
    tracing::info!("Seller: {}", config.seller_base_url);

    HttpServer::new(move || {
        App::new()
            .wrap(api::cors_headers())
            .wrap(Logger::default())
            .app_data(client.clone())
            .configure(api::configure::<PaidTransport>)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
