use crate::domain::catalog::Method;
use crate::domain::money::Amount;
use crate::domain::payment::{CreatePayment, Payment, PaymentStatus};
use crate::domain::ports::{PaymentGateway, TokenProvider};
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct GatewayState {
    methods: Vec<Method>,
    payments: HashMap<u64, Payment>,
    next_id: u64,
}

/// A thread-safe in-memory payment backend.
///
/// Uses `Arc<RwLock<..>>` so clones share the same payments. Ideal for
/// testing and for running the CLI without a server.
#[derive(Default, Clone)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<GatewayState>>,
    offline: Arc<AtomicBool>,
    payment_fetches: Arc<AtomicUsize>,
}

impl InMemoryPaymentGateway {
    /// Creates a new, empty in-memory gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway that serves `methods` as its catalog.
    pub fn with_methods(methods: Vec<Method>) -> Self {
        Self {
            state: Arc::new(RwLock::new(GatewayState {
                methods,
                ..GatewayState::default()
            })),
            ..Self::default()
        }
    }

    /// Inserts or replaces a payment as if the server had updated it.
    pub async fn put_payment(&self, payment: Payment) {
        let mut state = self.state.write().await;
        let id = match payment.id {
            Some(id) => id,
            None => {
                state.next_id += 1;
                state.next_id
            }
        };
        state.next_id = state.next_id.max(id);
        state.payments.insert(id, Payment { id: Some(id), ..payment });
    }

    /// Moves a stored payment to `status`.
    pub async fn set_status(&self, payment_id: u64, status: PaymentStatus) -> Result<()> {
        let mut state = self.state.write().await;
        let payment = state
            .payments
            .get_mut(&payment_id)
            .ok_or_else(|| CheckoutError::HttpStatus {
                status: 404,
                message: format!("payment {payment_id} not found"),
            })?;
        payment.status = status;
        payment.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Makes every call fail with a transport error while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of single-payment fetches served so far.
    pub fn payment_fetches(&self) -> usize {
        self.payment_fetches.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(CheckoutError::Transport("network unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn methods(&self, amount: Amount) -> Result<Vec<Method>> {
        self.check_online()?;
        let state = self.state.read().await;
        Ok(state
            .methods
            .iter()
            .filter(|method| method.accepts(amount))
            .cloned()
            .collect())
    }

    async fn create_payment(&self, request: &CreatePayment) -> Result<Payment> {
        self.check_online()?;
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = state.next_id;
        let now = Utc::now();
        let payment = Payment {
            id: Some(id),
            mollie_id: Some(format!("tr_{id:010}")),
            method: request.method.clone(),
            issuer: request.issuer.clone(),
            amount: request.amount,
            description: request.description.clone(),
            url: Some(format!("https://pay.example/checkout/{id}")),
            status: PaymentStatus::Open,
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.payments.insert(id, payment.clone());
        Ok(payment)
    }

    async fn payment(&self, payment_id: u64) -> Result<Payment> {
        self.check_online()?;
        self.payment_fetches.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        state
            .payments
            .get(&payment_id)
            .cloned()
            .ok_or_else(|| CheckoutError::HttpStatus {
                status: 404,
                message: format!("payment {payment_id} not found"),
            })
    }

    async fn payments(&self) -> Result<Vec<Payment>> {
        self.check_online()?;
        let state = self.state.read().await;
        let mut payments: Vec<Payment> = state.payments.values().cloned().collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(payments)
    }
}

/// Hands out one fixed device token.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}
