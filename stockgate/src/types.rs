//! Core domain types for `StockGate`.
//!
//! All identifier types use smart constructors to ensure validity at
//! construction time, following the "parse, don't validate" principle.
//! Once a value is constructed, no further validation is needed anywhere
//! downstream.

use chrono::{DateTime, Utc};
use nutype::nutype;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a product in the catalog and the inventory ledger.
///
/// `ProductId` values are guaranteed to be non-empty and at most 64
/// characters. The value is embedded into counter-store keys, so the
/// character budget keeps keys short.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 64),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct ProductId(String);

/// Identifies the user making a purchase attempt.
///
/// Rate-limit windows are keyed by `UserId`, so two requests carrying the
/// same (trimmed) value share a window.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 128),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct UserId(String);

/// A globally unique order identifier using UUIDv7 format.
///
/// `OrderId` values are guaranteed to be UUIDv7, which provides:
/// - Time-based ordering capability
/// - Globally unique identification at admission time
/// - A natural idempotency key for durable persistence
#[nutype(
    validate(predicate = |id: &Uuid| id.get_version() == Some(uuid::Version::SortRand)),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new `OrderId` with the current timestamp.
    ///
    /// This is a convenience method that generates a new `UUIDv7`.
    pub fn new() -> Self {
        // This will always succeed as Uuid::now_v7() always returns a valid v7 UUID
        Self::try_new(Uuid::now_v7()).expect("Uuid::now_v7() should always return a valid v7 UUID")
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

/// The number of units requested in a single purchase attempt.
///
/// Quantities are at least 1 and at most 100. Admission is granted one
/// inventory unit at a time; the quantity is recorded on the resulting
/// order.
#[nutype(
    validate(greater_or_equal = 1, less_or_equal = 100),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Display,
        Into,
        Serialize,
        Deserialize
    )
)]
pub struct Quantity(u32);

impl Quantity {
    /// A quantity of exactly one unit, the common flash-sale case.
    pub fn one() -> Self {
        Self::try_new(1).expect("1 is always a valid quantity")
    }
}

/// The moment an order was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wraps a UTC `DateTime`.
    pub const fn new(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Creates a timestamp representing the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying `DateTime`.
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::new(datetime)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn product_id_accepts_valid_strings(s in "[a-zA-Z0-9_-]{1,64}") {
            let result = ProductId::try_new(s.clone());
            prop_assert!(result.is_ok());
            let id = result.unwrap();
            prop_assert_eq!(id.as_ref(), &s);
        }

        #[test]
        fn product_id_trims_whitespace(s in " {0,5}[a-zA-Z0-9_-]{1,50} {0,5}") {
            let result = ProductId::try_new(s.clone());
            prop_assert!(result.is_ok());
            let id = result.unwrap();
            prop_assert_eq!(id.as_ref(), s.trim());
        }

        #[test]
        fn product_id_rejects_blank_strings(s in " {0,20}") {
            prop_assert!(ProductId::try_new(s).is_err());
        }

        #[test]
        fn product_id_rejects_strings_over_64_chars(s in "[a-zA-Z0-9]{65,128}") {
            prop_assert!(ProductId::try_new(s).is_err());
        }

        #[test]
        fn user_id_roundtrip_serialization(s in "[a-zA-Z0-9_-]{1,128}") {
            let user_id = UserId::try_new(s).unwrap();
            let json = serde_json::to_string(&user_id).unwrap();
            let deserialized: UserId = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(user_id, deserialized);
        }

        #[test]
        fn quantity_accepts_values_in_range(q in 1u32..=100u32) {
            let quantity = Quantity::try_new(q).unwrap();
            let value: u32 = quantity.into();
            prop_assert_eq!(value, q);
        }

        #[test]
        fn quantity_rejects_values_out_of_range(q in 101u32..=u32::MAX) {
            prop_assert!(Quantity::try_new(q).is_err());
        }
    }

    #[test]
    fn quantity_rejects_zero() {
        assert!(Quantity::try_new(0).is_err());
    }

    #[test]
    fn quantity_one_is_one() {
        let value: u32 = Quantity::one().into();
        assert_eq!(value, 1);
    }

    #[test]
    fn order_id_new_creates_valid_v7() {
        let order_id = OrderId::new();
        assert_eq!(
            order_id.as_ref().get_version(),
            Some(uuid::Version::SortRand)
        );
    }

    #[test]
    fn order_id_rejects_non_v7_uuids() {
        assert!(OrderId::try_new(Uuid::nil()).is_err());
        assert!(OrderId::try_new(Uuid::max()).is_err());
    }

    #[test]
    fn order_ids_are_unique() {
        let first = OrderId::new();
        let second = OrderId::new();
        assert_ne!(first, second);
    }

    #[test]
    fn timestamp_now_is_current() {
        let before = Utc::now();
        let timestamp = Timestamp::now();
        let after = Utc::now();
        assert!(timestamp.as_datetime() >= &before);
        assert!(timestamp.as_datetime() <= &after);
    }

    #[test]
    fn timestamp_roundtrip_serialization() {
        let timestamp = Timestamp::now();
        let json = serde_json::to_string(&timestamp).unwrap();
        let deserialized: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(timestamp, deserialized);
    }
}
