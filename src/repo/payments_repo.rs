use crate::domain::payment::PaymentRecord;
use anyhow::anyhow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory stand-in for the host framework's payment store. The provider
/// never touches this directly; handlers look records up here and hand them
/// to the provider.
#[derive(Clone, Default)]
pub struct PaymentsRepo {
    payments: Arc<Mutex<HashMap<Uuid, PaymentRecord>>>,
}

impl PaymentsRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: PaymentRecord) -> anyhow::Result<()> {
        let mut payments = self
            .payments
            .lock()
            .map_err(|_| anyhow!("payments store poisoned"))?;
        payments.insert(record.id, record);
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> anyhow::Result<Option<PaymentRecord>> {
        let payments = self
            .payments
            .lock()
            .map_err(|_| anyhow!("payments store poisoned"))?;
        Ok(payments.get(&id).cloned())
    }

    pub fn with_payment_mut<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut PaymentRecord) -> R,
    ) -> anyhow::Result<Option<R>> {
        let mut payments = self
            .payments
            .lock()
            .map_err(|_| anyhow!("payments store poisoned"))?;
        Ok(payments.get_mut(&id).map(f))
    }
}
