use crate::provider::ecpay::EcpayError;

#[derive(Clone)]
pub struct EcpayConfig {
    pub merchant_id: String,
    pub merchant_name: String,
    pub hash_key: String,
    pub hash_iv: String,
    pub checkout_url: String,
    pub bind_addr: String,
    pub public_base_url: String,
}

impl EcpayConfig {
    pub fn from_env() -> Self {
        Self {
            merchant_id: std::env::var("ECPAY_MERCHANT_ID")
                .unwrap_or_else(|_| "2000132".to_string()),
            merchant_name: std::env::var("ECPAY_MERCHANT_NAME")
                .unwrap_or_else(|_| "Shop Name".to_string()),
            hash_key: std::env::var("ECPAY_HASH_KEY")
                .unwrap_or_else(|_| "5294y06JbISpM5x9".to_string()),
            hash_iv: std::env::var("ECPAY_HASH_IV")
                .unwrap_or_else(|_| "v77hoKGq4kWxNNIS".to_string()),
            checkout_url: std::env::var("ECPAY_CHECKOUT_URL").unwrap_or_else(|_| {
                "https://payment-stage.ecpay.com.tw/Cashier/AioCheckOut/V5".to_string()
            }),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), EcpayError> {
        for (name, value) in [
            ("merchant_id", &self.merchant_id),
            ("hash_key", &self.hash_key),
            ("hash_iv", &self.hash_iv),
            ("checkout_url", &self.checkout_url),
        ] {
            if value.trim().is_empty() {
                return Err(EcpayError::Config(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}
