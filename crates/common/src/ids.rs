//! Integer identifiers assigned by the individual stores.

use serde::{Deserialize, Serialize};

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw integer identifier.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the underlying integer.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
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

integer_id!(
    /// Identifier of a user account, issued by the accounts service.
    UserId
);
integer_id!(
    /// Identifier of a catalog product.
    ProductId
);
integer_id!(
    /// Identifier of a catalog category.
    CategoryId
);
integer_id!(
    /// Identifier of a single line in a cart.
    CartItemId
);
integer_id!(
    /// Identifier of an order.
    OrderId
);
