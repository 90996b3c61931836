//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the entities the record store
//! persists. These fixtures are consistent and predictable; timestamps are
//! already at millisecond precision so they survive a round trip unchanged.

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::{Record, Value};
use domain_billing::{Payment, PaymentMethod};
use domain_party::{Party, PartyKind};
use rust_decimal_macros::dec;

/// Fixture for timestamps
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Settlement time used across payment fixtures (Jan 15, 2024 09:30:00.250)
    pub fn settlement() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
            + chrono::Duration::milliseconds(250)
    }

    /// A timestamp with sub-millisecond digits
    pub fn with_micros() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
            + chrono::Duration::microseconds(123_456)
    }
}

/// Fixture for payments
pub struct PaymentFixtures;

impl PaymentFixtures {
    /// Payment "A1": 100.00 USD by bank transfer
    pub fn usd_a1() -> Payment {
        Payment::new("A1", dec!(100.00), "USD")
    }

    /// A settled EUR card payment carrying every optional attribute
    pub fn settled_eur() -> Payment {
        let mut payment = Payment::new("E1", dec!(2500.75), "EUR")
            .with_method(PaymentMethod::CreditCard)
            .with_reference("CARD-7781")
            .with_metadata("channel", "web")
            .with_metadata("batch", "2024-01-15");
        payment.exchange_rate = Some(1.0875);
        payment.settle(TemporalFixtures::settlement());
        payment
    }

    /// `count` payments with ids `P0..`, alternating USD and EUR
    pub fn mixed_currencies(count: usize) -> Vec<Payment> {
        (0..count)
            .map(|i| {
                let currency = if i % 2 == 0 { "USD" } else { "EUR" };
                Payment::new(format!("P{i}"), dec!(10.00) * rust_decimal::Decimal::from(i + 1), currency)
            })
            .collect()
    }
}

/// Fixture for parties
pub struct PartyFixtures;

impl PartyFixtures {
    pub fn jane_doe() -> Party {
        Party::individual("PTY-JANE", "Jane Doe").with_email("jane@example.com")
    }

    pub fn acme() -> Party {
        Party::corporate("PTY-ACME", "Acme Mutual")
            .with_email("ops@acme.example")
            .with_attribute("segment", "enterprise")
    }

    pub fn smith_trust() -> Party {
        Party::new("PTY-SMITH", "Smith Family Trust", PartyKind::Trust)
    }
}

/// Fixture for raw rows as a backend would return them
pub struct RowFixtures;

impl RowFixtures {
    /// A well-formed payments row for `id`
    pub fn payment_row(id: &str) -> Record {
        Record::new()
            .with("id", id)
            .with("created_at", "2024-01-15 09:30:00.250")
            .with("updated_at", "2024-01-15 09:30:00.250")
            .with("status", 1i64)
            .with("amount", "100.00")
            .with("currency", "USD")
            .with("method", 0i64)
            .with("reference", Value::Null)
            .with("exchange_rate", Value::Null)
            .with("settled_at", Value::Null)
            .with("metadata_json", "")
    }

    /// A payments row whose `amount` is not a number
    pub fn payment_row_bad_amount(id: &str) -> Record {
        Self::payment_row(id).with("amount", "one hundred")
    }

    /// A payments row without an `id` column
    pub fn payment_row_without_id() -> Record {
        Self::payment_row("unused").without("id")
    }

    /// A single-row count result
    pub fn count_row(count: i64) -> Record {
        Record::new().with("count", count)
    }
}
