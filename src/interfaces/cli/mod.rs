//! Command-line front end driving the checkout state machines.

pub mod render;

use crate::application::events::drain;
use crate::application::flow::PaymentFlowStateMachine;
use crate::application::selection::SelectionStateMachine;
use crate::application::watcher::{CompletionWatcher, Reconciliation, parse_deep_link};
use crate::config::CheckoutConfig;
use crate::domain::catalog::SelectableEntry;
use crate::domain::flow::{BrowserChoice, FlowPolicy, HostScreen};
use crate::domain::payment::{CreatePayment, Payment, PaymentDraft};
use crate::domain::ports::{PaymentGatewayRef, TokenProviderRef};
use crate::domain::product::{DEMO_PRODUCTS, DemoProduct};
use crate::error::{CheckoutError, Result};
use crate::infrastructure::http::HttpPaymentGateway;
use crate::infrastructure::in_memory::StaticTokenProvider;
use crate::infrastructure::token::FileTokenProvider;
use clap::{Parser, Subcommand};
use render::Renderer;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root URL of the checkout API
    #[arg(long, default_value = "http://localhost:8000/api/")]
    pub base_url: String,

    /// How open payments are handed to a browser
    #[arg(long, value_enum, default_value_t = FlowPolicy::AskUser)]
    pub flow_policy: FlowPolicy,

    /// Create payments without choosing a method first (the server picks)
    #[arg(long)]
    pub skip_method_selection: bool,

    /// Connect and response timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Device token to send instead of the one stored in --token-file
    #[arg(long)]
    pub device_token: Option<String>,

    /// File holding the device token; created on first use
    #[arg(long, default_value = ".checkout-device-token")]
    pub token_file: PathBuf,

    /// Log filter, e.g. `info` or `checkout_flow=debug`
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the demo products used to prefill a payment
    Products,
    /// List payment methods available for an amount
    Methods {
        #[arg(long)]
        amount: String,
    },
    /// List payments of this device, newest first
    Payments,
    /// Show one payment
    Payment { id: u64 },
    /// Run an existing payment through the payment flow again
    Resume {
        id: u64,
        /// Answer to the browser prompt under the ask-user policy
        #[arg(long, value_enum)]
        choice: Option<BrowserChoice>,
    },
    /// Create a payment and run it through the payment flow
    Checkout {
        /// Amount in EUR; a random demo product is used when omitted
        #[arg(long, requires = "description")]
        amount: Option<String>,
        #[arg(long, requires = "amount")]
        description: Option<String>,
        /// Method or issuer ids to toggle, in order. Issuers of the expanded
        /// method take precedence; `method/issuer` names an issuer directly
        #[arg(long)]
        pick: Vec<String>,
        /// Answer to the browser prompt under the ask-user policy
        #[arg(long, value_enum)]
        choice: Option<BrowserChoice>,
    },
    /// Handle a deep link returned by the payment page
    DeepLink { link: String },
}

impl Cli {
    pub fn config(&self) -> Result<CheckoutConfig> {
        Ok(CheckoutConfig::new(&self.base_url)?
            .with_flow_policy(self.flow_policy)
            .with_method_selection(!self.skip_method_selection)
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }

    fn gateway(&self, config: &CheckoutConfig) -> Result<PaymentGatewayRef> {
        let tokens: TokenProviderRef = match &self.device_token {
            Some(token) => Arc::new(StaticTokenProvider::new(token.clone())),
            None => Arc::new(FileTokenProvider::new(self.token_file.clone())),
        };
        Ok(Arc::new(HttpPaymentGateway::new(config, tokens)?))
    }
}

/// Runs `cli` against the HTTP gateway, writing results to `out`.
pub async fn run<W: Write>(cli: &Cli, out: W) -> Result<()> {
    let config = cli.config()?;
    let mut renderer = Renderer::new(out);

    // Commands that need no server are answered before any client is built.
    match &cli.command {
        Command::Products => return Ok(renderer.products(DEMO_PRODUCTS)?),
        Command::DeepLink { link } if parse_deep_link(link).is_none() => {
            return Ok(renderer.line(&format!("ignored: {link}"))?);
        }
        _ => {}
    }

    let gateway = cli.gateway(&config)?;
    execute(&cli.command, &config, gateway, &mut renderer).await
}

/// Executes one command against an explicit gateway.
pub async fn execute<W: Write>(
    command: &Command,
    config: &CheckoutConfig,
    gateway: PaymentGatewayRef,
    renderer: &mut Renderer<W>,
) -> Result<()> {
    match command {
        Command::Products => renderer.products(DEMO_PRODUCTS)?,
        Command::Methods { amount } => {
            let amount = amount.parse()?;
            renderer.methods(&gateway.methods(amount).await?)?;
        }
        Command::Payments => renderer.payments(&gateway.payments().await?)?,
        Command::Payment { id } => renderer.payment(&gateway.payment(*id).await?)?,
        Command::Resume { id, choice } => {
            let payment = gateway.payment(*id).await?;
            renderer.payment(&payment)?;
            run_flow(config, payment, HostScreen::PaymentsList, *choice, renderer)?;
        }
        Command::Checkout {
            amount,
            description,
            pick,
            choice,
        } => {
            let draft = match (amount, description) {
                (Some(amount), Some(description)) => PaymentDraft::parse(amount, description)?,
                _ => {
                    let product = DemoProduct::random();
                    PaymentDraft {
                        amount: product.price,
                        description: product.name.to_string(),
                    }
                }
            };
            let request = if config.select_payment_method {
                select_method(&gateway, draft, pick, renderer).await?
            } else {
                draft.into_request()
            };
            checkout(config, &gateway, &request, *choice, renderer).await?;
        }
        Command::DeepLink { link } => {
            let (mut flow, mut directives) = PaymentFlowStateMachine::new(config.flow_policy);
            let watcher = CompletionWatcher::new(gateway);
            let outcome = watcher.on_deep_link(&mut flow, link).await?;
            let summary = match outcome {
                Reconciliation::Completed => "payment completed",
                Reconciliation::InProgress => "payment still in progress",
                Reconciliation::Skipped => "ignored",
                Reconciliation::Stale => "stale result dropped",
            };
            renderer.line(summary)?;
            for directive in drain(&mut directives) {
                renderer.directive(&directive)?;
            }
        }
    }
    Ok(())
}

/// Replays `picks` through a selection machine and derives the request.
async fn select_method<W: Write>(
    gateway: &PaymentGatewayRef,
    draft: PaymentDraft,
    picks: &[String],
    renderer: &mut Renderer<W>,
) -> Result<CreatePayment> {
    let (mut selection, _events) = SelectionStateMachine::new();
    selection.load_catalog(gateway.methods(draft.amount).await?);

    for pick in picks {
        if let Some((method_id, issuer_id)) = pick.split_once('/') {
            let expanded = selection
                .current_expanded_method()
                .is_some_and(|method| method.id == method_id);
            if !expanded {
                selection.toggle_expand(method_id);
            }
            match visible_issuer(&selection, issuer_id) {
                Some(entry) => selection.toggle_select(entry),
                None => warn!(%pick, "no issuer with this id under the method"),
            }
            continue;
        }

        // Issuers of the expanded method first: an issuer may share its method id.
        let entry = visible_issuer(&selection, pick).or_else(|| {
            selection
                .catalog()
                .iter()
                .find(|method| &method.id == pick)
                .cloned()
                .map(SelectableEntry::Method)
        });
        match entry {
            Some(entry) => selection.toggle_select(entry),
            None => warn!(%pick, "no method or visible issuer with this id"),
        }
    }

    renderer.selection(&selection.list_rows())?;
    if !selection.can_continue() {
        let method = selection
            .current_expanded_method()
            .map(|method| method.title().to_string())
            .unwrap_or_default();
        return Err(CheckoutError::MalformedData(format!(
            "Please select an issuer for {method}"
        )));
    }
    Ok(selection.build_payment_request(draft.amount, &draft.description))
}

fn visible_issuer(selection: &SelectionStateMachine, issuer_id: &str) -> Option<SelectableEntry> {
    selection
        .current_expanded_method()
        .and_then(|method| method.issuer(issuer_id))
        .cloned()
        .map(SelectableEntry::Issuer)
}

async fn checkout<W: Write>(
    config: &CheckoutConfig,
    gateway: &PaymentGatewayRef,
    request: &CreatePayment,
    choice: Option<BrowserChoice>,
    renderer: &mut Renderer<W>,
) -> Result<()> {
    let payment = gateway.create_payment(request).await?;
    renderer.payment(&payment)?;
    run_flow(config, payment, HostScreen::CreatePayment, choice, renderer)
}

/// Executes `payment` from `host` and prints the directives it produces.
fn run_flow<W: Write>(
    config: &CheckoutConfig,
    payment: Payment,
    host: HostScreen,
    choice: Option<BrowserChoice>,
    renderer: &mut Renderer<W>,
) -> Result<()> {
    let (mut flow, mut directives) = PaymentFlowStateMachine::new(config.flow_policy);
    flow.execute(payment, host);
    let mut emitted = drain(&mut directives);

    if let Some(choice) = choice {
        debug!(?choice, "answering browser prompt");
        flow.choose(choice);
        emitted.extend(drain(&mut directives));
    }

    for directive in &emitted {
        renderer.directive(directive)?;
    }
    Ok(())
}
