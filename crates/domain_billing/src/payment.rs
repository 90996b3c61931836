//! Payment records
//!
//! A payment is money received against an account, in a single currency.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use core_kernel::{truncate_to_millis, EntityBase, Ordinal};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank transfer
    #[default]
    BankTransfer,
    /// Credit card
    CreditCard,
    /// Direct debit
    DirectDebit,
    /// Check/cheque
    Check,
    /// Cash
    Cash,
}

impl Ordinal for PaymentMethod {
    fn ordinal(self) -> i64 {
        match self {
            PaymentMethod::BankTransfer => 0,
            PaymentMethod::CreditCard => 1,
            PaymentMethod::DirectDebit => 2,
            PaymentMethod::Check => 3,
            PaymentMethod::Cash => 4,
        }
    }

    fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            0 => Some(PaymentMethod::BankTransfer),
            1 => Some(PaymentMethod::CreditCard),
            2 => Some(PaymentMethod::DirectDebit),
            3 => Some(PaymentMethod::Check),
            4 => Some(PaymentMethod::Cash),
            _ => None,
        }
    }
}

/// A payment record
///
/// # Stored normalization
///
/// `created_at`, `updated_at` and `settled_at` are stored at millisecond
/// precision. Values built through this type's methods are already
/// truncated, so they round-trip exactly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Payment {
    #[serde(flatten)]
    pub base: EntityBase,
    /// Payment amount
    pub amount: Decimal,
    /// ISO 4217 currency code
    pub currency: String,
    /// Payment method
    pub method: PaymentMethod,
    /// External reference (bank ref, transaction ID)
    pub reference: Option<String>,
    /// Rate applied when the payment was converted from another currency
    ///
    /// Stores reject NaN and infinite rates.
    pub exchange_rate: Option<f64>,
    /// When the funds settled
    pub settled_at: Option<DateTime<Utc>>,
    /// Free-form attributes
    pub metadata: BTreeMap<String, String>,
}

impl Payment {
    /// Creates an unsettled bank-transfer payment
    pub fn new(id: impl Into<String>, amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            base: EntityBase::with_id(id),
            amount,
            currency: currency.into(),
            method: PaymentMethod::default(),
            reference: None,
            exchange_rate: None,
            settled_at: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.base.id
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Changes the amount and marks the payment as modified
    pub fn set_amount(&mut self, amount: Decimal) {
        self.amount = amount;
        self.base.touch();
    }

    /// Records settlement at the given time
    pub fn settle(&mut self, at: DateTime<Utc>) {
        self.settled_at = Some(truncate_to_millis(at));
        self.base.touch();
    }

    pub fn is_settled(&self) -> bool {
        self.settled_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_settle_truncates_to_stored_precision() {
        let mut payment = Payment::new("A1", dec!(100), "USD");
        let at = Utc::now();
        payment.settle(at);
        assert!(payment.is_settled());
        assert_eq!(payment.settled_at, Some(truncate_to_millis(at)));
    }

    #[test]
    fn test_method_ordinals_are_stable() {
        assert_eq!(PaymentMethod::Cash.ordinal(), 4);
        assert_eq!(PaymentMethod::from_ordinal(1), Some(PaymentMethod::CreditCard));
        assert_eq!(PaymentMethod::from_ordinal(-1), None);
    }
}
