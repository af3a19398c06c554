#![forbid(unsafe_code)]

//! Stable identities for registry items.
//!
//! Ids are handed out by [`RegistryBuilder`](crate::RegistryBuilder) and are
//! the position of the item in its collection. They are only meaningful for
//! the registry that issued them.

use std::fmt;

macro_rules! registry_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub(crate) fn from_index(index: usize) -> Self {
                Self(u32::try_from(index).unwrap_or(u32::MAX))
            }

            /// Position of the item in its collection.
            #[inline]
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

registry_id!(
    /// Identity of a [`Layer`](crate::Layer). Higher indices draw above lower ones.
    LayerId,
    "layer"
);

registry_id!(
    /// Identity of a [`Group`](crate::Group).
    GroupId,
    "group"
);

registry_id!(
    /// Identity of a [`WindowDefinition`](crate::WindowDefinition).
    WindowId,
    "window"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips() {
        assert_eq!(WindowId::from_index(7).index(), 7);
        assert_eq!(LayerId::from_index(0).index(), 0);
    }

    #[test]
    fn display_names_the_collection() {
        assert_eq!(LayerId::from_index(2).to_string(), "layer#2");
        assert_eq!(GroupId::from_index(1).to_string(), "group#1");
        assert_eq!(WindowId::from_index(3).to_string(), "window#3");
    }

    #[test]
    fn ordering_follows_index() {
        assert!(LayerId::from_index(1) > LayerId::from_index(0));
    }
}
