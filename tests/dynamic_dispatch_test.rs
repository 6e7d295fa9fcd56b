use checkout_flow::domain::money::Amount;
use checkout_flow::domain::payment::CreatePayment;
use checkout_flow::domain::ports::{PaymentGatewayRef, TokenProviderRef};
use checkout_flow::infrastructure::in_memory::{InMemoryPaymentGateway, StaticTokenProvider};
use rust_decimal_macros::dec;
use std::sync::Arc;

#[tokio::test]
async fn test_collaborators_as_trait_objects() {
    let gateway: PaymentGatewayRef = Arc::new(InMemoryPaymentGateway::new());
    let tokens: TokenProviderRef = Arc::new(StaticTokenProvider::new("device-1"));

    let request = CreatePayment {
        method: None,
        issuer: None,
        amount: Amount::new(dec!(7.5)).unwrap(),
        description: "Comic book".to_string(),
    };

    // Verify Send + Sync by spawning tasks
    let creator = Arc::clone(&gateway);
    let created = tokio::spawn(async move { creator.create_payment(&request).await.unwrap() })
        .await
        .unwrap();
    let token = tokio::spawn(async move { tokens.token().await.unwrap() })
        .await
        .unwrap();

    let fetched = gateway.payment(created.id.unwrap()).await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(token, "device-1");
}
