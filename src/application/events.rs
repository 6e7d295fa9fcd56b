//! Notifications published by the state machines.
//!
//! Each machine owns the sending half of an unbounded channel; presentation
//! adapters and host screens hold the receiver. A dropped receiver means the
//! subscriber is gone and events are discarded.

use crate::domain::catalog::{Method, SelectableEntry};
use crate::domain::payment::{Payment, PaymentStatus};
use tokio::sync::mpsc;
use tracing::trace;

/// Emitted by the selection state machine for the list and grid adapters.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    SelectionChanged(Option<SelectableEntry>),
    Deselected(SelectableEntry),
    ExpansionChanged(Option<Method>),
}

/// Where an embedded browser goes in the host's navigation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddedPlacement {
    /// Replace the whole stack (host was the create-payment screen).
    ReplaceStack,
    /// Push on top, keeping the way back.
    Push,
}

/// Emitted by the payment flow for the flow UI and the payments list.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowDirective {
    PresentExternalBrowser { url: String },
    /// Control left the app; close the create-payment screen.
    DismissCreateScreen,
    PresentEmbeddedBrowser {
        payment: Payment,
        placement: EmbeddedPlacement,
    },
    PromptChoice,
    PresentStatusMessage { status: PaymentStatus },
    RefreshPaymentsList,
    DismissBrowser,
}

/// Sending half shared by both machines.
#[derive(Debug, Clone)]
pub(crate) struct Publisher<E> {
    tx: mpsc::UnboundedSender<E>,
}

impl<E: std::fmt::Debug> Publisher<E> {
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<E>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub(crate) fn publish(&self, event: E) {
        trace!(?event, "publishing");
        if self.tx.send(event).is_err() {
            trace!("subscriber dropped, event discarded");
        }
    }
}

/// Drains everything currently queued on `rx` without waiting.
pub fn drain<E>(rx: &mut mpsc::UnboundedReceiver<E>) -> Vec<E> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
