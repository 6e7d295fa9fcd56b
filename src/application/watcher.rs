use super::flow::PaymentFlowStateMachine;
use crate::domain::payment::Payment;
use crate::domain::ports::PaymentGatewayRef;
use crate::error::Result;
use tracing::{debug, error, info};
use url::Url;

/// Outcome of reconciling one completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Nothing to check (no session, or the link was not a payment link).
    Skipped,
    /// The payment is still open or pending.
    InProgress,
    /// The payment reached a terminal status.
    Completed,
    /// The flow moved on while the fetch was in flight; the result was dropped.
    Stale,
}

/// Extracts the payment id from a deep link: the final path segment, decimal digits only.
pub fn parse_deep_link(link: &str) -> Option<u64> {
    let url = Url::parse(link.trim()).ok()?;
    let segment = url.path_segments()?.next_back()?;
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

fn in_flight_id(flow: &PaymentFlowStateMachine) -> Option<u64> {
    flow.in_flight().and_then(|payment| payment.id)
}

/// Correlates deep links and foreground events with the in-flight payment.
///
/// Completion is never taken from the signal itself: the payment is re-fetched
/// and the server's answer decides.
pub struct CompletionWatcher {
    gateway: PaymentGatewayRef,
}

impl CompletionWatcher {
    pub fn new(gateway: PaymentGatewayRef) -> Self {
        Self { gateway }
    }

    /// The app returned to the foreground. Re-checks the in-flight payment, if any.
    pub async fn on_foreground(&self, flow: &mut PaymentFlowStateMachine) -> Result<Reconciliation> {
        let Some(payment_id) = in_flight_id(flow) else {
            debug!("foreground without payment in flight");
            return Ok(Reconciliation::Skipped);
        };

        let payment = self.fetch(payment_id).await?;
        Ok(self.apply_foreground_result(flow, payment_id, payment))
    }

    /// Applies a foreground re-fetch of `requested_id` that completed later.
    ///
    /// The user may have abandoned or restarted the flow meanwhile, in which
    /// case the result no longer belongs to the session and is dropped.
    pub fn apply_foreground_result(
        &self,
        flow: &mut PaymentFlowStateMachine,
        requested_id: u64,
        payment: Payment,
    ) -> Reconciliation {
        if in_flight_id(flow) != Some(requested_id) {
            debug!(requested_id, "dropping stale foreground result");
            return Reconciliation::Stale;
        }
        self.reevaluate(flow, payment)
    }

    /// A deep link came back from the browser or an external app.
    pub async fn on_deep_link(
        &self,
        flow: &mut PaymentFlowStateMachine,
        link: &str,
    ) -> Result<Reconciliation> {
        let Some(payment_id) = parse_deep_link(link) else {
            debug!(link, "ignoring deep link without payment id");
            return Ok(Reconciliation::Skipped);
        };
        info!(payment_id, "deep link received");

        let payment = self.fetch(payment_id).await?;
        Ok(self.reevaluate(flow, payment))
    }

    /// Feeds a fetched payment into the flow.
    pub fn reevaluate(&self, flow: &mut PaymentFlowStateMachine, payment: Payment) -> Reconciliation {
        if flow.observe(payment) {
            Reconciliation::Completed
        } else {
            Reconciliation::InProgress
        }
    }

    async fn fetch(&self, payment_id: u64) -> Result<Payment> {
        self.gateway.payment(payment_id).await.inspect_err(|err| {
            error!(payment_id, %err, "re-fetching payment failed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deep_link() {
        assert_eq!(parse_deep_link("mollie-checkout://payments/42"), Some(42));
        assert_eq!(parse_deep_link("https://example.com/return/7"), Some(7));
        assert_eq!(parse_deep_link("mollie-checkout://42"), None);
        assert_eq!(parse_deep_link("mollie-checkout://payments/abc"), None);
        assert_eq!(parse_deep_link("mollie-checkout://payments/+42"), None);
        assert_eq!(parse_deep_link("mollie-checkout://payments/42/"), None);
        assert_eq!(parse_deep_link("not a link"), None);
        assert_eq!(parse_deep_link("mailto:42"), None);
    }
}
