//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity: two instances holding the same values are
/// equal. They are immutable; to "modify" one, build a new one (which re-runs
/// whatever validation its constructor enforces).
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Price(Decimal);
///
/// impl ValueObject for Price {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
