pub mod config;
pub mod domain {
    pub mod payment;
}
pub mod provider {
    pub mod checkmac;
    pub mod ecpay;
}
pub mod repo {
    pub mod payments_repo;
}
pub mod http {
    pub mod handlers {
        pub mod payments;
    }
}

#[derive(Clone)]
pub struct AppState {
    pub provider: std::sync::Arc<provider::ecpay::EcpayProvider>,
    pub payments_repo: repo::payments_repo::PaymentsRepo,
    pub checkout_url: String,
    pub public_base_url: String,
}
