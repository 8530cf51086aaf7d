use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Waiting,
    Input,
    Confirmed,
    Rejected,
    Refunded,
    Error,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentRequest {
    pub currency: String,
    pub total: i64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentView {
    pub payment_id: Uuid,
    pub status: PaymentStatus,
    pub currency: String,
    pub total: i64,
    pub message: Option<String>,
    pub transaction_id: Option<String>,
}

/// Narrow host-side surface the provider works against. The host framework
/// owns the concrete record; the provider only reads it when building the
/// redirect form and writes status/message/transaction id when a callback
/// verifies.
pub trait Payment {
    fn id(&self) -> Uuid;
    fn currency(&self) -> &str;
    fn total(&self) -> i64;
    fn description(&self) -> &str;
    fn process_url(&self) -> String;
    fn success_url(&self) -> String;
    fn failure_url(&self) -> String;
    fn change_status(&mut self, status: PaymentStatus);
    fn set_message(&mut self, message: String);
    fn set_transaction_id(&mut self, transaction_id: String);
}

#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub variant: String,
    pub currency: String,
    pub total: i64,
    pub description: String,
    pub status: PaymentStatus,
    pub message: Option<String>,
    pub transaction_id: Option<String>,
    pub process_url: String,
    pub success_url: String,
    pub failure_url: String,
}

impl PaymentRecord {
    pub fn view(&self) -> PaymentView {
        PaymentView {
            payment_id: self.id,
            status: self.status,
            currency: self.currency.clone(),
            total: self.total,
            message: self.message.clone(),
            transaction_id: self.transaction_id.clone(),
        }
    }
}

impl Payment for PaymentRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn currency(&self) -> &str {
        &self.currency
    }

    fn total(&self) -> i64 {
        self.total
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn process_url(&self) -> String {
        self.process_url.clone()
    }

    fn success_url(&self) -> String {
        self.success_url.clone()
    }

    fn failure_url(&self) -> String {
        self.failure_url.clone()
    }

    fn change_status(&mut self, status: PaymentStatus) {
        self.status = status;
    }

    fn set_message(&mut self, message: String) {
        self.message = Some(message);
    }

    fn set_transaction_id(&mut self, transaction_id: String) {
        self.transaction_id = Some(transaction_id);
    }
}
