//! Application layer containing the checkout state machines.
//!
//! `SelectionStateMachine` and `PaymentFlowStateMachine` are plain synchronous
//! owners of their state, mutated serially by the screen that created them.
//! They publish to the outside world over `tokio` channels. `CompletionWatcher`
//! is the only async piece: it re-fetches payments through the injected gateway.

pub mod events;
pub mod flow;
pub mod selection;
pub mod watcher;
