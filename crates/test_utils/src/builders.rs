//! Test Data Builders
//!
//! Provides builder patterns for constructing test entities with sensible
//! defaults. Tests specify only the attributes they care about.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use core_kernel::{truncate_to_millis, RecordStatus};
use domain_billing::{Payment, PaymentMethod};
use domain_party::{Party, PartyKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Builder for constructing test payments
pub struct TestPaymentBuilder {
    id: String,
    amount: Decimal,
    currency: String,
    method: PaymentMethod,
    status: RecordStatus,
    reference: Option<String>,
    exchange_rate: Option<f64>,
    settled_at: Option<DateTime<Utc>>,
    metadata: BTreeMap<String, String>,
}

impl Default for TestPaymentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPaymentBuilder {
    /// Creates a new builder for an unsettled 100.00 USD bank transfer
    pub fn new() -> Self {
        Self {
            id: core_kernel::new_record_id(),
            amount: dec!(100.00),
            currency: "USD".to_string(),
            method: PaymentMethod::BankTransfer,
            status: RecordStatus::Active,
            reference: None,
            exchange_rate: None,
            settled_at: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_exchange_rate(mut self, rate: f64) -> Self {
        self.exchange_rate = Some(rate);
        self
    }

    /// Sets the settlement time, truncated to milliseconds
    pub fn settled_at(mut self, at: DateTime<Utc>) -> Self {
        self.settled_at = Some(truncate_to_millis(at));
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Builds the payment
    pub fn build(self) -> Payment {
        let mut payment = Payment::new(self.id, self.amount, self.currency).with_method(self.method);
        payment.base.status = self.status;
        payment.reference = self.reference;
        payment.exchange_rate = self.exchange_rate;
        payment.settled_at = self.settled_at;
        payment.metadata = self.metadata;
        payment
    }
}

/// Builder for constructing test parties
pub struct TestPartyBuilder {
    id: String,
    display_name: String,
    kind: PartyKind,
    email: Option<String>,
    verified: bool,
    risk_score: f64,
    attributes: BTreeMap<String, String>,
}

impl Default for TestPartyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPartyBuilder {
    /// Creates a new builder for an unverified individual
    pub fn new() -> Self {
        Self {
            id: core_kernel::new_record_id(),
            display_name: "Test Party".to_string(),
            kind: PartyKind::Individual,
            email: None,
            verified: false,
            risk_score: 0.0,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_kind(mut self, kind: PartyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }

    pub fn with_risk_score(mut self, score: f64) -> Self {
        self.risk_score = score;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builds the party
    pub fn build(self) -> Party {
        let mut party = Party::new(self.id, self.display_name, self.kind);
        party.email = self.email;
        party.verified = self.verified;
        party.risk_score = self.risk_score;
        party.attributes = self.attributes;
        party
    }
}
