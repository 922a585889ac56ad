//! Typed handles for mesh elements.
//!
//! Vertices, half-edges and faces live in flat arrays owned by
//! [`HalfEdgeMesh`](super::HalfEdgeMesh); everything else refers to them by
//! handle. Handles are generic over the integer width so small meshes can use
//! `u16` and huge ones `u64`.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Integer types usable as mesh handles.
///
/// The largest value of each type is reserved as the invalid sentinel.
pub trait MeshIndex:
    Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static
{
    /// Sentinel for "no element".
    const INVALID: Self;

    /// Convert from a storage position.
    ///
    /// # Panics
    /// Debug builds panic if the value does not fit.
    fn from_usize(v: usize) -> Self;

    /// Convert to a storage position.
    fn to_usize(self) -> usize;

    /// Check that this is not the sentinel.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($($ty:ty),*) => {
        $(
            impl MeshIndex for $ty {
                const INVALID: Self = <$ty>::MAX;

                #[inline]
                fn from_usize(v: usize) -> Self {
                    debug_assert!(
                        v < <$ty>::MAX as usize,
                        "index {} too large for {}",
                        v,
                        stringify!($ty)
                    );
                    v as $ty
                }

                #[inline]
                fn to_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_mesh_index!(u16, u32, u64);

/// Handle to a vertex.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// Handle to a directed half-edge.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// Handle to a face.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

macro_rules! impl_handle {
    ($name:ident, $tag:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create a handle from a storage position.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// The invalid handle.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Storage position of the element.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Check that this handle is not the sentinel.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $tag, self.index())
                } else {
                    write!(f, "{}(INVALID)", $tag)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }
    };
}

impl_handle!(VertexId, "V");
impl_handle!(HalfEdgeId, "HE");
impl_handle!(FaceId, "F");

impl<I: MeshIndex> HalfEdgeId<I> {
    /// The other half of the same edge.
    ///
    /// Half-edges are always allocated in pairs, so the partner differs only
    /// in the lowest bit.
    #[inline]
    pub fn opposite(self) -> Self {
        debug_assert!(self.is_valid());
        Self::new(self.index() ^ 1)
    }

    /// Position of the undirected edge this half-edge belongs to.
    #[inline]
    pub fn edge_index(self) -> usize {
        self.index() >> 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_roundtrip() {
        let v: VertexId = VertexId::new(42);
        assert_eq!(v.index(), 42);
        assert!(v.is_valid());
        assert!(!VertexId::<u32>::invalid().is_valid());
        assert!(!FaceId::<u16>::default().is_valid());
    }

    #[test]
    fn test_opposite_pairs() {
        let a: HalfEdgeId = HalfEdgeId::new(6);
        let b = a.opposite();
        assert_eq!(b.index(), 7);
        assert_eq!(b.opposite(), a);
        assert_eq!(a.edge_index(), b.edge_index());
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", HalfEdgeId::<u64>::new(3)), "HE(3)");
        assert_eq!(format!("{:?}", FaceId::<u32>::invalid()), "F(INVALID)");
    }
}
