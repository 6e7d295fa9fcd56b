use crate::domain::flow::FlowPolicy;
use crate::error::{CheckoutError, Result};
use std::time::Duration;
use url::Url;

/// Connect and response timeout of the transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Process-wide checkout settings, read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutConfig {
    /// API root; always ends with `/` so endpoint joins keep its path.
    pub base_url: Url,
    pub flow_policy: FlowPolicy,
    /// Whether the user picks a method before the payment is created.
    pub select_payment_method: bool,
    pub timeout: Duration,
}

impl CheckoutConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            flow_policy: FlowPolicy::default(),
            select_payment_method: true,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_flow_policy(mut self, policy: FlowPolicy) -> Self {
        self.flow_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_method_selection(mut self, enabled: bool) -> Self {
        self.select_payment_method = enabled;
        self
    }
}

fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() {
        return Err(CheckoutError::Config(format!("'{raw}' cannot be used as API root")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = CheckoutConfig::new("https://api.example.com/v1").unwrap();
        assert_eq!(config.base_url.as_str(), "https://api.example.com/v1/");
        assert_eq!(
            config.base_url.join("payments/3").unwrap().as_str(),
            "https://api.example.com/v1/payments/3"
        );
    }

    #[test]
    fn test_defaults() {
        let config = CheckoutConfig::new("http://localhost:8080").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.flow_policy, FlowPolicy::AskUser);
        assert!(config.select_payment_method);
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            CheckoutConfig::new("not a url"),
            Err(CheckoutError::Config(_))
        ));
        assert!(matches!(
            CheckoutConfig::new("mailto:someone"),
            Err(CheckoutError::Config(_))
        ));
    }
}
