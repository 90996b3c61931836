//! Tests for the payment entity and its persistence codec

use chrono::{TimeZone, Utc};
use core_kernel::{DecodeError, DecodePolicy, RecordCodec, RecordStatus, RowReader, Value};
use domain_billing::codec::columns;
use domain_billing::{Payment, PaymentCodec, PaymentMethod};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn decode(record: &core_kernel::Record, policy: DecodePolicy) -> (Result<Payment, DecodeError>, usize) {
    let mut reader = RowReader::new(record, policy);
    let result = PaymentCodec.decode(&mut reader);
    let issues = reader.issues().len();
    (result, issues)
}

fn full_payment() -> Payment {
    let mut payment = Payment::new("A1", dec!(100.00), "USD")
        .with_method(PaymentMethod::DirectDebit)
        .with_reference("BANK-REF-7")
        .with_metadata("channel", "portal");
    payment.exchange_rate = Some(1.0825);
    payment.settle(Utc.with_ymd_and_hms(2024, 6, 30, 17, 0, 0).unwrap());
    payment
}

mod encode_tests {
    use super::*;

    #[test]
    fn test_encodes_base_and_entity_columns() {
        let record = PaymentCodec.encode(&full_payment());

        for column in ["id", "created_at", "updated_at", "status"] {
            assert!(record.contains(column), "missing base column {}", column);
        }
        assert_eq!(record.get(columns::AMOUNT), Some(&Value::Text("100.00".into())));
        assert_eq!(record.get(columns::CURRENCY), Some(&Value::from("USD")));
        assert_eq!(record.get(columns::METHOD), Some(&Value::Integer(2)));
        assert_eq!(record.get("status"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_absent_optionals_are_omitted() {
        let record = PaymentCodec.encode(&Payment::new("A2", dec!(5), "EUR"));
        assert!(!record.contains(columns::REFERENCE));
        assert!(!record.contains(columns::EXCHANGE_RATE));
        assert!(!record.contains(columns::SETTLED_AT));
        assert_eq!(record.get(columns::METADATA_JSON), Some(&Value::Blob(String::new())));
    }

    #[test]
    fn test_metadata_is_json_text() {
        let record = PaymentCodec.encode(&full_payment());
        let text = record.get(columns::METADATA_JSON).and_then(Value::as_text).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed["channel"], "portal");
    }
}

mod decode_tests {
    use super::*;

    #[test]
    fn test_round_trip_is_exact() {
        let payment = full_payment();
        let (decoded, issues) = decode(&PaymentCodec.encode(&payment), DecodePolicy::FailFast);
        assert_eq!(decoded.unwrap(), payment);
        assert_eq!(issues, 0);
    }

    #[test]
    fn test_bad_exchange_rate_spares_other_attributes() {
        let payment = full_payment();
        let mut record = PaymentCodec.encode(&payment);
        record.insert(columns::EXCHANGE_RATE, "one point oh");

        let (decoded, issues) = decode(&record, DecodePolicy::BestEffort);
        let decoded = decoded.unwrap();

        assert_eq!(issues, 1);
        assert_eq!(decoded.exchange_rate, None);
        assert_eq!(
            Payment { exchange_rate: payment.exchange_rate, ..decoded },
            payment
        );
    }

    #[test]
    fn test_missing_currency_fails_row() {
        let record = PaymentCodec.encode(&full_payment()).without(columns::CURRENCY);
        let (decoded, _) = decode(&record, DecodePolicy::BestEffort);
        assert_eq!(decoded.unwrap_err(), DecodeError::missing(columns::CURRENCY));
    }

    #[test]
    fn test_status_ordinal_decodes() {
        let mut record = PaymentCodec.encode(&full_payment());
        record.insert("status", 3i64);
        let (decoded, _) = decode(&record, DecodePolicy::FailFast);
        assert_eq!(decoded.unwrap().base.status, RecordStatus::Archived);
    }
}

proptest! {
    #[test]
    fn prop_payment_round_trip(
        cents in 0i64..10_000_000_000i64,
        currency in prop_oneof![Just("USD"), Just("EUR"), Just("GBP"), Just("INR")],
        method in 0i64..5,
        reference in proptest::option::of("[A-Z0-9-]{1,16}"),
        rate in proptest::option::of(0.0001f64..1000.0),
        metadata in proptest::collection::btree_map("[a-z]{1,6}", "[a-z0-9 ]{0,10}", 0..3),
    ) {
        let mut payment = Payment::new("P-1", Decimal::new(cents, 2), currency);
        payment.method = <PaymentMethod as core_kernel::Ordinal>::from_ordinal(method).unwrap();
        payment.reference = reference;
        payment.exchange_rate = rate;
        payment.metadata = metadata;

        let (decoded, _) = decode(&PaymentCodec.encode(&payment), DecodePolicy::FailFast);
        prop_assert_eq!(decoded.unwrap(), payment);
    }
}
