#![allow(dead_code)]

use checkout_flow::domain::catalog::{Image, Issuer, Method};
use checkout_flow::domain::money::Amount;
use checkout_flow::domain::payment::{Payment, PaymentStatus};
use rust_decimal_macros::dec;

pub fn issuer(id: &str, name: &str) -> Issuer {
    Issuer {
        id: id.to_string(),
        name: name.to_string(),
        image: Image::default(),
    }
}

pub fn method(id: &str, title: &str, issuers: Vec<Issuer>) -> Method {
    Method {
        id: id.to_string(),
        description: title.to_string(),
        minimum_amount: None,
        maximum_amount: None,
        image: Image::default(),
        issuers: (!issuers.is_empty()).then_some(issuers),
        pricing: None,
    }
}

pub fn credit_card() -> Method {
    method("creditcard", "Credit card", vec![])
}

pub fn bank() -> Method {
    method(
        "ideal",
        "iDEAL",
        vec![issuer("abn", "ABN AMRO"), issuer("ing", "ING")],
    )
}

pub fn giftcard() -> Method {
    method(
        "giftcard",
        "Gift card",
        vec![issuer("fashioncheque", "Fashioncheque")],
    )
}

pub fn catalog() -> Vec<Method> {
    vec![credit_card(), bank(), giftcard()]
}

pub fn payment(id: u64, status: PaymentStatus, url: Option<&str>) -> Payment {
    Payment {
        id: Some(id),
        mollie_id: Some(format!("tr_{id}")),
        method: Some("ideal".to_string()),
        issuer: Some("abn".to_string()),
        amount: Amount::new(dec!(19.99)).unwrap(),
        description: "Walkman".to_string(),
        url: url.map(str::to_string),
        status,
        created_at: None,
        updated_at: None,
    }
}
