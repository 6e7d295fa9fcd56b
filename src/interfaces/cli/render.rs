use crate::application::events::{EmbeddedPlacement, FlowDirective};
use crate::application::selection::ListRow;
use crate::domain::catalog::{Method, SelectableEntry};
use crate::domain::money::CURRENCY;
use crate::domain::payment::Payment;
use crate::domain::product::DemoProduct;
use std::io::{self, Write};

/// Writes human-readable checkout output to any `Write` sink (e.g. Stdout).
pub struct Renderer<W: Write> {
    out: W,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn products(&mut self, products: &[DemoProduct]) -> io::Result<()> {
        for product in products {
            writeln!(self.out, "{:<32} {} {}", product.name, product.price, CURRENCY)?;
        }
        Ok(())
    }

    pub fn methods(&mut self, methods: &[Method]) -> io::Result<()> {
        if methods.is_empty() {
            return writeln!(self.out, "no payment methods available");
        }
        for method in methods {
            writeln!(self.out, "{:<16} {}", method.id, method.title())?;
            for issuer in method.issuers() {
                writeln!(self.out, "  {:<14} {}", issuer.id, issuer.title())?;
            }
        }
        Ok(())
    }

    /// The list presentation: selected row marked with `*`, issuers indented.
    pub fn selection(&mut self, rows: &[ListRow]) -> io::Result<()> {
        for row in rows {
            let marker = if row.selected { '*' } else { ' ' };
            let indent = if row.nested { "    " } else { "" };
            let kind = match row.entry {
                SelectableEntry::Method(_) => "method",
                SelectableEntry::Issuer(_) => "issuer",
            };
            writeln!(
                self.out,
                "{marker} {indent}{} ({kind}: {})",
                row.entry.title(),
                row.entry.id()
            )?;
        }
        Ok(())
    }

    pub fn payment(&mut self, payment: &Payment) -> io::Result<()> {
        let id = payment
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            self.out,
            "#{id} {:<8} {} {} {}",
            payment.status, payment.amount, CURRENCY, payment.description
        )?;
        if let Some(method) = &payment.method {
            match &payment.issuer {
                Some(issuer) => writeln!(self.out, "    via {method} / {issuer}")?,
                None => writeln!(self.out, "    via {method}")?,
            }
        }
        if let Some(created_at) = payment.created_at {
            writeln!(self.out, "    created {}", created_at.to_rfc3339())?;
        }
        Ok(())
    }

    pub fn payments(&mut self, payments: &[Payment]) -> io::Result<()> {
        if payments.is_empty() {
            return writeln!(self.out, "no payments yet");
        }
        payments.iter().try_for_each(|payment| self.payment(payment))
    }

    pub fn directive(&mut self, directive: &FlowDirective) -> io::Result<()> {
        match directive {
            FlowDirective::PresentExternalBrowser { url } => {
                writeln!(self.out, "open external browser: {url}")
            }
            FlowDirective::DismissCreateScreen => writeln!(self.out, "close create-payment screen"),
            FlowDirective::PresentEmbeddedBrowser { payment, placement } => {
                let how = match placement {
                    EmbeddedPlacement::ReplaceStack => "replacing",
                    EmbeddedPlacement::Push => "on top of",
                };
                writeln!(
                    self.out,
                    "open in-app browser {how} current screen: {}",
                    payment.url.as_deref().unwrap_or("-")
                )
            }
            FlowDirective::PromptChoice => {
                writeln!(self.out, "choose a browser: external or in-app")
            }
            FlowDirective::PresentStatusMessage { status } => {
                writeln!(self.out, "payment status: {status}")
            }
            FlowDirective::RefreshPaymentsList => writeln!(self.out, "refresh payments list"),
            FlowDirective::DismissBrowser => writeln!(self.out, "close browser"),
        }
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }
}
