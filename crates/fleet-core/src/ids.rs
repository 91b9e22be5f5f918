//! Strongly typed, zero-cost identifier wrappers.
//!
//! IDs are `Copy + Ord + Hash` so they work as map keys and sort keys.  Unlike
//! a dense SoA index, a fleet id is a stable label: vehicles and orders are
//! added and removed during a session, so ids are never reused and never
//! assumed to equal a `Vec` position.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// The id following this one; used by allocators.
            #[inline(always)]
            pub fn next(self) -> $name {
                $name(self.0 + 1)
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Fleet vehicle label.  Allocated sequentially from 1.
    pub struct VehicleId(u32);
}

typed_id! {
    /// Transport order label.
    pub struct OrderId(u32);
}

typed_id! {
    /// Road blockage label.
    pub struct BlockageId(u32);
}

typed_id! {
    /// Alert log entry label.  `u64` because alerts churn fastest.
    pub struct AlertId(u64);
}
