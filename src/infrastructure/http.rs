use crate::config::CheckoutConfig;
use crate::domain::catalog::Method;
use crate::domain::money::Amount;
use crate::domain::payment::{CreatePayment, Payment};
use crate::domain::ports::{PaymentGateway, TokenProviderRef};
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

/// Header carrying the device token that scopes payments on the server.
pub const DEVICE_TOKEN_HEADER: &str = "X-Mollie-Checkout-Device-UUID";

/// Every response body is wrapped in `{ "data": ... }`.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// `PaymentGateway` backed by the checkout REST API.
///
/// Each call is a single attempt bounded by the configured timeout.
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: Url,
    tokens: TokenProviderRef,
}

impl HttpPaymentGateway {
    pub fn new(config: &CheckoutConfig, tokens: TokenProviderRef) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            tokens,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn send<T>(&self, request: reqwest::RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let token = self.tokens.token().await?;
        let response = request
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(DEVICE_TOKEN_HEADER, token)
            .send()
            .await
            .inspect_err(|err| error!(%err, "request failed"))?;

        let status = response.status();
        debug!(url = %response.url(), %status, "response received");
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CheckoutError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(CheckoutError::Transport("no data in response".to_string()));
        }
        let envelope: Envelope<T> = serde_json::from_slice(&body)
            .map_err(|e| CheckoutError::MalformedData(e.to_string()))?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn methods(&self, amount: Amount) -> Result<Vec<Method>> {
        let mut url = self.endpoint("methods")?;
        url.query_pairs_mut()
            .append_pair("amount", &amount.to_string());
        self.send(self.client.get(url)).await
    }

    async fn create_payment(&self, request: &CreatePayment) -> Result<Payment> {
        let url = self.endpoint("payments")?;
        self.send(self.client.post(url).json(request)).await
    }

    async fn payment(&self, payment_id: u64) -> Result<Payment> {
        let url = self.endpoint(&format!("payments/{payment_id}"))?;
        self.send(self.client.get(url)).await
    }

    async fn payments(&self) -> Result<Vec<Payment>> {
        let url = self.endpoint("payments")?;
        let mut payments: Vec<Payment> = self.send(self.client.get(url)).await?;
        // Payments without a timestamp count as just created.
        let now = Utc::now();
        payments.sort_by(|a, b| {
            b.created_at
                .unwrap_or(now)
                .cmp(&a.created_at.unwrap_or(now))
        });
        Ok(payments)
    }
}
