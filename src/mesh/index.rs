//! Identifier types for mesh entities.
//!
//! Source meshes identify nodes and elements by opaque integers (usually
//! 1-based and shared between faces and cells). Output cells are labelled
//! 0-based in discovery order. Each gets its own newtype so the three
//! numbering schemes cannot be mixed up.

use std::fmt::{self, Debug, Display};

/// A node identifier in the source mesh.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

/// An element identifier in the source mesh (faces and cells share one id space).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ElementId(u32);

/// A 0-based cell label in the converted mesh.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct CellId(u32);

macro_rules! impl_id_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create an id from a raw value.
            ///
            /// # Panics
            /// Panics in debug builds if the value does not fit in 32 bits.
            #[inline]
            pub fn new(raw: usize) -> Self {
                debug_assert!(raw <= u32::MAX as usize, "id {} too large", raw);
                Self(raw as u32)
            }

            /// Get the raw value as `usize`.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Get the raw value.
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.0)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(v: u32) -> Self {
                Self(v)
            }
        }
    };
}

impl_id_type!(NodeId, "N");
impl_id_type!(ElementId, "E");
impl_id_type!(CellId, "C");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let n = NodeId::new(42);
        assert_eq!(n.index(), 42);
        assert_eq!(n.raw(), 42);
        assert_eq!(NodeId::from(42u32), n);
    }

    #[test]
    fn test_debug_and_display() {
        assert_eq!(format!("{:?}", NodeId::new(3)), "N(3)");
        assert_eq!(format!("{:?}", ElementId::new(7)), "E(7)");
        assert_eq!(format!("{:?}", CellId::new(0)), "C(0)");
        assert_eq!(CellId::new(15).to_string(), "15");
    }

    #[test]
    fn test_ordering() {
        let mut ids = vec![CellId::new(3), CellId::new(1), CellId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![CellId::new(1), CellId::new(2), CellId::new(3)]);
    }
}
