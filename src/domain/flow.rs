use serde::{Deserialize, Serialize};

/// How an open payment is handed to a browser. Process-wide, read-only at runtime.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FlowPolicy {
    AlwaysExternalBrowser,
    AlwaysInAppBrowser,
    #[default]
    AskUser,
}

/// The screen a flow was started from.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HostScreen {
    /// The create-payment screen; torn down or replaced once a browser takes over.
    CreatePayment,
    /// The payments list; browsers are stacked on top of it.
    PaymentsList,
}

/// The user's answer to the browser choice prompt.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BrowserChoice {
    External,
    InApp,
}
