//! Strongly typed identifier wrappers.
//!
//! Two families live here:
//!
//! - [`NodeId`] is the identity a node carries from the region source
//!   (an OpenStreetMap node id in practice).  It is stable across
//!   generations and is what callers pass in requests.
//! - [`NodeIdx`] / [`EdgeIdx`] are dense positions inside one graph
//!   generation.  They index the CSR arrays directly and are meaningless
//!   outside the generation that produced them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generate a dense index wrapper around a primitive integer.
macro_rules! typed_idx {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid index" (`MAX`).
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized indices are visibly invalid.
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

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_idx! {
    /// Position of a node in one generation's node arrays.
    pub struct NodeIdx(u32);
}

typed_idx! {
    /// Position of a directed edge in one generation's edge arrays.
    pub struct EdgeIdx(u32);
}

/// Provider-assigned node identifier.
///
/// Two regions reporting the same `NodeId` describe the same physical
/// intersection; composition inserts it once.  Serialized as a bare integer.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    #[inline]
    fn from(raw: u64) -> Self {
        NodeId(raw)
    }
}
