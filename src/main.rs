use axum::routing::{get, post};
use axum::Router;
use payments_ecpay::config::EcpayConfig;
use payments_ecpay::provider::ecpay::EcpayProvider;
use payments_ecpay::repo::payments_repo::PaymentsRepo;
use payments_ecpay::AppState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = EcpayConfig::from_env();
    let checkout_url = cfg.checkout_url.clone();
    let public_base_url = cfg.public_base_url.clone();
    let bind_addr = cfg.bind_addr.clone();
    let provider = Arc::new(EcpayProvider::new(cfg)?);

    let state = AppState {
        provider,
        payments_repo: PaymentsRepo::new(),
        checkout_url,
        public_base_url,
    };

    let app = Router::new()
        .route("/health", get(payments_ecpay::http::handlers::payments::health))
        .route("/payments", post(payments_ecpay::http::handlers::payments::create_payment))
        .route(
            "/payments/:payment_id",
            get(payments_ecpay::http::handlers::payments::get_payment),
        )
        .route(
            "/payments/:payment_id/checkout",
            get(payments_ecpay::http::handlers::payments::checkout),
        )
        .route(
            "/payments/:payment_id/process",
            post(payments_ecpay::http::handlers::payments::process_callback),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
