use super::money::Amount;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A canned product used to prefill the create-payment form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoProduct {
    pub name: &'static str,
    pub price: Amount,
}

impl DemoProduct {
    const fn new(name: &'static str, price: Decimal) -> Self {
        Self {
            name,
            price: Amount::from_positive(price),
        }
    }

    pub fn random() -> &'static DemoProduct {
        DEMO_PRODUCTS
            .choose(&mut rand::thread_rng())
            .unwrap_or(&DEMO_PRODUCTS[0])
    }
}

pub const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct::new("Walkman", dec!(19.99)),
    DemoProduct::new("Goldfish", dec!(2.99)),
    DemoProduct::new("Back to the future DVD", dec!(6)),
    DemoProduct::new("Running shoes", dec!(49)),
    DemoProduct::new("Haircut for men - appointment", dec!(29.95)),
    DemoProduct::new("Electric Vehicle", dec!(49999)),
    DemoProduct::new("Comic book", dec!(7.5)),
    DemoProduct::new("Game console", dec!(495)),
    DemoProduct::new("Drone", dec!(900)),
    DemoProduct::new("Encyclopedia", dec!(28.99)),
    DemoProduct::new("Robot arm", dec!(1459)),
    DemoProduct::new("Virtual reality headset", dec!(599)),
    DemoProduct::new("Smartwatch", dec!(379.95)),
    DemoProduct::new("Spencer", dec!(28.75)),
];
