//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating entities whose attributes
//! stay within what the stores persist exactly.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::Ordinal;
use domain_billing::{Payment, PaymentMethod};
use domain_party::{Party, PartyKind};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for ISO 4217 currency codes
pub fn currency_code_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("USD".to_string()),
        Just("EUR".to_string()),
        Just("GBP".to_string()),
        Just("JPY".to_string()),
        Just("CHF".to_string()),
    ]
}

/// Strategy for amounts with two decimal places
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..1_000_000_000i64).prop_map(|minor| Decimal::new(minor, 2))
}

/// Strategy for timestamps at millisecond precision between 2000 and 2100
pub fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (946_684_800_000i64..4_102_444_800_000i64)
        .prop_map(|ms| Utc.timestamp_millis_opt(ms).unwrap())
}

/// Strategy for small string maps
pub fn attributes_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    proptest::collection::btree_map("[a-z_]{1,10}", "[ -~]{0,12}", 0..5)
}

pub fn payment_method_strategy() -> impl Strategy<Value = PaymentMethod> {
    (0i64..5).prop_map(|n| PaymentMethod::from_ordinal(n).unwrap_or_default())
}

pub fn party_kind_strategy() -> impl Strategy<Value = PartyKind> {
    (0i64..5).prop_map(|n| PartyKind::from_ordinal(n).unwrap_or_default())
}

/// Strategy for payments with every attribute populated at random
pub fn payment_strategy() -> impl Strategy<Value = Payment> {
    (
        "[A-Z]{2}[0-9]{1,6}",
        amount_strategy(),
        currency_code_strategy(),
        payment_method_strategy(),
        proptest::option::of("[A-Z0-9-]{1,16}"),
        proptest::option::of(0.0001f64..1000.0),
        proptest::option::of(timestamp_strategy()),
        attributes_strategy(),
    )
        .prop_map(
            |(id, amount, currency, method, reference, exchange_rate, settled_at, metadata)| {
                let mut payment = Payment::new(id, amount, currency).with_method(method);
                payment.reference = reference;
                payment.exchange_rate = exchange_rate;
                payment.settled_at = settled_at;
                payment.metadata = metadata;
                payment
            },
        )
}

/// Strategy for parties with every attribute populated at random
pub fn party_strategy() -> impl Strategy<Value = Party> {
    (
        "PTY-[0-9]{1,8}",
        "[A-Za-z][A-Za-z .'-]{0,30}",
        party_kind_strategy(),
        proptest::option::of("[a-z]{1,8}@[a-z]{1,8}\\.example"),
        any::<bool>(),
        0.0f64..100.0,
        attributes_strategy(),
    )
        .prop_map(|(id, name, kind, email, verified, risk_score, attributes)| {
            let mut party = Party::new(id, name, kind);
            party.email = email;
            party.verified = verified;
            party.risk_score = risk_score;
            party.attributes = attributes;
            party
        })
}
