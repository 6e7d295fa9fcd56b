use super::events::{EmbeddedPlacement, FlowDirective, Publisher};
use crate::domain::flow::{BrowserChoice, FlowPolicy, HostScreen};
use crate::domain::payment::{Payment, PaymentStatus};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Deciding,
    ExternalBrowserLaunched,
    InAppBrowserPresented,
    ChoicePrompted,
    Terminal,
}

/// What the user currently sees for the payment under execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Surface {
    #[default]
    None,
    ExternalBrowser,
    InAppBrowser,
    ChoicePrompt,
}

/// A payment in execution.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSession {
    pub payment: Payment,
    pub surface: Surface,
    /// Set when the flow started on the create-payment screen.
    pub tear_down_host: bool,
}

/// Decides how a payment is handed to a browser and tracks it until a
/// terminal status is observed.
///
/// No operation fails: absent or invalid data is logged and ignored.
#[derive(Debug)]
pub struct PaymentFlowStateMachine {
    policy: FlowPolicy,
    state: FlowState,
    session: Option<FlowSession>,
    directives: Publisher<FlowDirective>,
}

impl PaymentFlowStateMachine {
    pub fn new(policy: FlowPolicy) -> (Self, UnboundedReceiver<FlowDirective>) {
        let (directives, rx) = Publisher::channel();
        let machine = Self {
            policy,
            state: FlowState::Idle,
            session: None,
            directives,
        };
        (machine, rx)
    }

    pub fn policy(&self) -> FlowPolicy {
        self.policy
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn session(&self) -> Option<&FlowSession> {
        self.session.as_ref()
    }

    /// The payment currently in execution, if any.
    pub fn in_flight(&self) -> Option<&Payment> {
        self.session.as_ref().map(|session| &session.payment)
    }

    /// Starts executing `payment` from `host`.
    pub fn execute(&mut self, payment: Payment, host: HostScreen) {
        debug!(payment_id = ?payment.id, status = %payment.status, ?host, "executing payment");

        if payment.status != PaymentStatus::Open {
            // Re-opening a browser would re-trigger a payment that already moved on.
            self.session = None;
            self.state = FlowState::Terminal;
            self.directives.publish(FlowDirective::PresentStatusMessage {
                status: payment.status,
            });
            return;
        }

        if self.policy == FlowPolicy::AlwaysExternalBrowser && payment.checkout_url().is_none() {
            warn!(payment_id = ?payment.id, url = ?payment.url, "payment has no valid checkout url");
            return;
        }

        self.state = FlowState::Deciding;
        self.session = Some(FlowSession {
            payment,
            surface: Surface::None,
            tear_down_host: host == HostScreen::CreatePayment,
        });

        match self.policy {
            FlowPolicy::AlwaysExternalBrowser => self.open_external_browser(),
            FlowPolicy::AlwaysInAppBrowser => self.present_embedded_browser(),
            FlowPolicy::AskUser => {
                self.set_surface(Surface::ChoicePrompt);
                self.state = FlowState::ChoicePrompted;
                self.directives.publish(FlowDirective::PromptChoice);
            }
        }
    }

    /// Applies the user's answer to the browser prompt.
    pub fn choose(&mut self, choice: BrowserChoice) {
        if self.state != FlowState::ChoicePrompted {
            debug!(?choice, state = ?self.state, "no choice pending");
            return;
        }
        match choice {
            BrowserChoice::External => self.open_external_browser(),
            BrowserChoice::InApp => self.present_embedded_browser(),
        }
    }

    /// The user closed the prompt without choosing.
    pub fn dismiss_prompt(&mut self) {
        if self.state != FlowState::ChoicePrompted {
            return;
        }
        debug!("browser prompt dismissed");
        self.session = None;
        self.state = FlowState::Terminal;
    }

    /// The user walked away from the flow.
    pub fn abandon(&mut self) {
        if self.session.take().is_some() {
            debug!("flow abandoned");
        }
        self.state = FlowState::Terminal;
    }

    /// Feeds a freshly fetched payment into the flow. The latest fetch always
    /// wins; a completed status ends the session.
    ///
    /// Returns whether the payment was completed.
    pub fn observe(&mut self, payment: Payment) -> bool {
        let completed = payment.status.completed();

        if let Some(session) = self.session.as_mut()
            && session.payment.id == payment.id
        {
            session.payment = payment.clone();
        }

        if !completed {
            debug!(payment_id = ?payment.id, status = %payment.status, "payment still in progress");
            return false;
        }

        info!(payment_id = ?payment.id, status = %payment.status, "payment completed");
        self.session = None;
        self.state = FlowState::Terminal;
        self.directives.publish(FlowDirective::RefreshPaymentsList);
        self.directives.publish(FlowDirective::DismissBrowser);
        true
    }

    fn open_external_browser(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(url) = session.payment.checkout_url() else {
            warn!(payment_id = ?session.payment.id, url = ?session.payment.url, "payment has no valid checkout url");
            return;
        };
        let tear_down_host = session.tear_down_host;

        self.set_surface(Surface::ExternalBrowser);
        self.state = FlowState::ExternalBrowserLaunched;
        self.directives.publish(FlowDirective::PresentExternalBrowser {
            url: url.to_string(),
        });
        if tear_down_host {
            self.directives.publish(FlowDirective::DismissCreateScreen);
        }
    }

    fn present_embedded_browser(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let placement = if session.tear_down_host {
            EmbeddedPlacement::ReplaceStack
        } else {
            EmbeddedPlacement::Push
        };
        let payment = session.payment.clone();

        self.set_surface(Surface::InAppBrowser);
        self.state = FlowState::InAppBrowserPresented;
        self.directives
            .publish(FlowDirective::PresentEmbeddedBrowser { payment, placement });
    }

    fn set_surface(&mut self, surface: Surface) {
        if let Some(session) = self.session.as_mut() {
            session.surface = surface;
        }
    }
}
