use crate::config::EcpayConfig;
use crate::domain::payment::{Payment, PaymentStatus};
use crate::provider::checkmac::{self, CHECK_MAC_FIELD};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

pub const VARIANT: &str = "ecpay";

// Gateway return codes. "1" is the terminal success indicator; the other two
// mean a pay code was issued and the buyer still has to complete payment.
const RTN_SUCCESS: &str = "1";
const RTN_ATM_ACCOUNT_ISSUED: &str = "2";
const RTN_CVS_CODE_ISSUED: &str = "10100073";

#[derive(Debug, Error)]
pub enum EcpayError {
    #[error("invalid merchant configuration: {0}")]
    Config(String),
    #[error("CheckMacValue verification failed")]
    Integrity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    Accepted,
    Rejected,
}

pub struct EcpayProvider {
    config: EcpayConfig,
}

impl EcpayProvider {
    pub fn new(config: EcpayConfig) -> Result<Self, EcpayError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Redirect field set for the auto-submit checkout form, signed with
    /// `CheckMacValue` over every other field present.
    pub fn get_hidden_fields(&self, payment: &dyn Payment) -> BTreeMap<String, String> {
        self.hidden_fields_at(payment, Utc::now())
    }

    pub fn hidden_fields_at(
        &self,
        payment: &dyn Payment,
        now: DateTime<Utc>,
    ) -> BTreeMap<String, String> {
        // Trade numbers are capped at 20 alphanumerics by the gateway.
        let trade_no: String = payment
            .id()
            .simple()
            .to_string()
            .chars()
            .take(20)
            .collect::<String>()
            .to_uppercase();
        // MerchantTradeDate is expressed in the gateway's local time (UTC+8).
        let trade_date = (now + Duration::hours(8)).format("%Y/%m/%d %H:%M:%S");

        let mut fields: BTreeMap<String, String> = [
            ("MerchantID", self.config.merchant_id.clone()),
            ("MerchantTradeNo", trade_no),
            ("MerchantTradeDate", trade_date.to_string()),
            ("PaymentType", "aio".to_string()),
            ("ChoosePayment", "ALL".to_string()),
            ("EncryptType", "1".to_string()),
            ("TotalAmount", payment.total().to_string()),
            ("TradeDesc", self.config.merchant_name.clone()),
            ("ItemName", payment.description().to_string()),
            ("ReturnURL", payment.process_url()),
            ("ClientBackURL", payment.success_url()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let mac = checkmac::check_mac_value(&fields, &self.config.hash_key, &self.config.hash_iv);
        fields.insert(CHECK_MAC_FIELD.to_string(), mac);
        fields
    }

    /// Handles the gateway's server-to-server callback. Rejection leaves the
    /// payment untouched; acceptance maps `RtnCode` onto the generic status
    /// and records message and transaction id.
    pub fn process_data(
        &self,
        payment: &mut dyn Payment,
        fields: &BTreeMap<String, String>,
    ) -> CallbackOutcome {
        if let Err(err) = self.verify_callback(fields) {
            tracing::warn!(payment_id = %payment.id(), %err, "rejected gateway callback");
            return CallbackOutcome::Rejected;
        }

        let (Some(rtn_code), Some(rtn_msg), Some(trade_no)) = (
            fields.get("RtnCode"),
            fields.get("RtnMsg"),
            fields.get("TradeNo"),
        ) else {
            tracing::warn!(payment_id = %payment.id(), "callback missing required fields");
            return CallbackOutcome::Rejected;
        };

        let status = match rtn_code.as_str() {
            RTN_SUCCESS => PaymentStatus::Confirmed,
            RTN_ATM_ACCOUNT_ISSUED | RTN_CVS_CODE_ISSUED => PaymentStatus::Input,
            _ => PaymentStatus::Rejected,
        };

        payment.change_status(status);
        payment.set_message(rtn_msg.clone());
        payment.set_transaction_id(trade_no.clone());
        tracing::info!(
            payment_id = %payment.id(),
            rtn_code = %rtn_code,
            status = ?status,
            "processed gateway callback"
        );
        CallbackOutcome::Accepted
    }

    fn verify_callback(&self, fields: &BTreeMap<String, String>) -> Result<(), EcpayError> {
        if checkmac::verify(fields, &self.config.hash_key, &self.config.hash_iv) {
            Ok(())
        } else {
            Err(EcpayError::Integrity)
        }
    }
}
