//! Newtype IDs for type-safe entity references.
//!
//! Every table in the store is keyed by a `SERIAL` integer. Wrapping those
//! integers keeps a `ProductId` from being passed where an `OrderId` belongs.

/// Define a type-safe ID wrapper around `i32`.
///
/// The generated type:
/// - serializes transparently (a bare JSON number)
/// - is `Copy`, `Eq`, `Ord` and `Hash`, so it can key maps and be sorted
/// - converts to and from `i32`
/// - implements the sqlx `Type`, `Encode`, `Decode` and `PgHasArrayType`
///   traits under the `postgres` feature
///
/// # Example
///
/// ```rust
/// # use shopeasy_core::define_id;
/// define_id!(
///     /// A coupon identifier.
///     CouponId
/// );
///
/// let id = CouponId::new(7);
/// assert_eq!(id.as_i32(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[macro_export]
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw database id.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// The raw database id.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value).map(Self)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::postgres::PgHasArrayType for $name {
            fn array_type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::postgres::PgHasArrayType>::array_type_info()
            }
        }
    };
}

define_id!(
    /// A registered shopper or admin account.
    UserId
);
define_id!(
    /// A catalog product.
    ProductId
);
define_id!(
    /// A placed order (internal id, not the public order number).
    OrderId
);
define_id!(
    /// A line item belonging to an order.
    OrderItemId
);
define_id!(
    /// A product review.
    ReviewId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_bare_numbers() {
        let json = serde_json::to_string(&ProductId::new(42)).unwrap_or_default();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_ids_sort_by_value() {
        let mut ids = vec![ProductId::new(3), ProductId::new(1), ProductId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![ProductId::new(1), ProductId::new(2), ProductId::new(3)]);
    }

    #[test]
    fn test_id_conversions() {
        let id = OrderId::from(9);
        assert_eq!(i32::from(id), 9);
        assert_eq!(id.to_string(), "9");
    }
}
