use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use alloy::providers::DynProvider;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use x402::{HttpFacilitator, SkaleRngOracle};
use x402_seller::{cors::build_cors, routes, AppState, SellerConfig};

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

    let config = match SellerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "configuration loaded");

    let oracle = match SkaleRngOracle::connect_http(&config.rpc_url, config.oracle_contract) {
        Ok(oracle) => oracle,
        Err(e) => {
            tracing::error!(error = %e, "failed to create oracle client");
            std::process::exit(1);
        }
    };

    let mut facilitator = match HttpFacilitator::new(&config.facilitator_url) {
        Ok(facilitator) => facilitator,
        Err(e) => {
            tracing::error!(error = %e, "failed to create facilitator client");
            std::process::exit(1);
        }
    };
    if let Some(secret) = &config.hmac_secret {
        facilitator = facilitator.with_hmac_secret(secret.clone());
    }

    let port = config.port;
    let rate_limit_rpm = config.rate_limit_rpm;

    tracing::info!("SKALE RNG seller listening at http://localhost:{port}");
    tracing::info!("Paid endpoint: POST {}", routes::RANDOM_WORD_PATH);
    tracing::info!(
        "Price: {} units of {} to {}",
        config.price_amount,
        config.asset,
        config.pay_to
    );
    tracing::info!("Facilitator: {}", config.facilitator_url);
    tracing::info!("Rate limit: {rate_limit_rpm} req/min per IP");

    let state = web::Data::new(AppState::new(config, facilitator, oracle));

    let governor_conf = match GovernorConfigBuilder::default()
        .requests_per_minute(rate_limit_rpm)
        .finish()
    {
        Some(conf) => conf,
        None => {
            tracing::error!("failed to build rate limiter config");
            std::process::exit(1);
        }
    };

    HttpServer::new(move || {
        App::new()
            .wrap(build_cors())
            .wrap(Governor::new(&governor_conf))
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure::<HttpFacilitator, SkaleRngOracle<DynProvider>>)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
