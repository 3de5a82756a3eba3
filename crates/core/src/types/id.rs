//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use shoestring_core::define_id;
/// define_id!(ProductId);
/// define_id!(CategoryId);
///
/// let product_id = ProductId::new(1);
/// let category_id = CategoryId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = category_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_roundtrip() {
        let id = ProductId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(ProductId::from(42), id);
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn test_product_id_serde_transparent() {
        let id = ProductId::new(7);
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "7");
        let back: ProductId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn test_product_id_display() {
        assert_eq!(ProductId::new(5).to_string(), "5");
    }
}
