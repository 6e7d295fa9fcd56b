use super::money::{Amount, CurrencyAmount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Icon references for a method or issuer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Image {
    #[serde(rename = "size_1x")]
    pub size1x: String,
    #[serde(rename = "size_2x")]
    pub size2x: String,
    pub svg: String,
}

/// A fee tier attached to a payment method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    pub description: String,
    pub fixed: CurrencyAmount,
    #[serde(with = "rust_decimal::serde::float")]
    pub variable: Decimal,
    #[serde(default)]
    pub fee_region: Option<String>,
}

/// A specific institution under a method that requires issuer selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issuer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Image,
}

impl Issuer {
    pub fn title(&self) -> &str {
        &self.name
    }
}

/// A payment method offered by the provider, possibly with nested issuers.
///
/// Immutable once received; a catalog refresh replaces every method wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Method {
    pub id: String,
    /// Display title.
    pub description: String,
    #[serde(default, alias = "minimum_mount")]
    pub minimum_amount: Option<CurrencyAmount>,
    #[serde(default, alias = "maximum_mount")]
    pub maximum_amount: Option<CurrencyAmount>,
    #[serde(default)]
    pub image: Image,
    #[serde(default)]
    pub issuers: Option<Vec<Issuer>>,
    #[serde(default)]
    pub pricing: Option<Vec<Price>>,
}

impl Method {
    pub fn title(&self) -> &str {
        &self.description
    }

    pub fn has_issuers(&self) -> bool {
        self.issuers.as_ref().is_some_and(|issuers| !issuers.is_empty())
    }

    pub fn issuers(&self) -> &[Issuer] {
        self.issuers.as_deref().unwrap_or_default()
    }

    pub fn issuer(&self, issuer_id: &str) -> Option<&Issuer> {
        self.issuers().iter().find(|issuer| issuer.id == issuer_id)
    }

    /// Whether `amount` falls inside the method's optional bounds.
    pub fn accepts(&self, amount: Amount) -> bool {
        let value = amount.value();
        let above_min = self
            .minimum_amount
            .as_ref()
            .is_none_or(|min| value >= min.value);
        let below_max = self
            .maximum_amount
            .as_ref()
            .is_none_or(|max| value <= max.value);
        above_min && below_max
    }
}

/// The atomic unit the selection state machine operates on.
///
/// Two entries are equal when they are the same variant with the same id,
/// regardless of the remaining fields.
#[derive(Debug, Clone)]
pub enum SelectableEntry {
    Method(Method),
    Issuer(Issuer),
}

impl SelectableEntry {
    pub fn id(&self) -> &str {
        match self {
            SelectableEntry::Method(method) => &method.id,
            SelectableEntry::Issuer(issuer) => &issuer.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SelectableEntry::Method(method) => method.title(),
            SelectableEntry::Issuer(issuer) => issuer.title(),
        }
    }

    pub fn image(&self) -> &Image {
        match self {
            SelectableEntry::Method(method) => &method.image,
            SelectableEntry::Issuer(issuer) => &issuer.image,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match self {
            SelectableEntry::Method(method) => Some(method),
            SelectableEntry::Issuer(_) => None,
        }
    }

    pub fn as_issuer(&self) -> Option<&Issuer> {
        match self {
            SelectableEntry::Issuer(issuer) => Some(issuer),
            SelectableEntry::Method(_) => None,
        }
    }
}

impl PartialEq for SelectableEntry {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SelectableEntry::Method(a), SelectableEntry::Method(b)) => a.id == b.id,
            (SelectableEntry::Issuer(a), SelectableEntry::Issuer(b)) => a.id == b.id,
            _ => false,
        }
    }
}

impl Eq for SelectableEntry {}

impl Hash for SelectableEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        self.id().hash(state);
    }
}

impl From<Method> for SelectableEntry {
    fn from(method: Method) -> Self {
        SelectableEntry::Method(method)
    }
}

impl From<Issuer> for SelectableEntry {
    fn from(issuer: Issuer) -> Self {
        SelectableEntry::Issuer(issuer)
    }
}
