use super::catalog::Method;
use super::money::Amount;
use super::payment::{CreatePayment, Payment};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Thin REST collaborator: every call is a single attempt, no retry.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Methods applicable to `amount`, in display order.
    async fn methods(&self, amount: Amount) -> Result<Vec<Method>>;
    async fn create_payment(&self, request: &CreatePayment) -> Result<Payment>;
    async fn payment(&self, payment_id: u64) -> Result<Payment>;
    /// All payments of this device, newest first.
    async fn payments(&self) -> Result<Vec<Payment>>;
}

/// Supplies the per-device token that scopes payments on the server.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String>;
}

pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
pub type TokenProviderRef = Arc<dyn TokenProvider>;
