//! Value types and collaborator ports of the checkout.

pub mod catalog;
pub mod flow;
pub mod money;
pub mod payment;
pub mod ports;
pub mod product;
