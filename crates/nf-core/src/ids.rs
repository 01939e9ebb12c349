use core::fmt;
use core::num::NonZeroU32;

/// Dense index into one of the mesh arenas (nodes, edges, markers, vertices).
///
/// Stored off by one in a `NonZeroU32`, so `Option<Id>` costs nothing extra.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Id of arena slot `index`. Saturates at the last representable slot.
    pub const fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Id of an arena position; arenas never exceed `u32::MAX - 1` entries.
    pub fn from_usize(index: usize) -> Self {
        Self::from_index(u32::try_from(index).unwrap_or(u32::MAX))
    }

    pub const fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// Arena position.
    #[inline]
    pub const fn idx(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

pub type NodeId = Id;
pub type EdgeId = Id;
pub type MarkerId = Id;
pub type VertexId = Id;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn optional_ids_are_free() {
        assert_eq!(
            core::mem::size_of::<NodeId>(),
            core::mem::size_of::<Option<NodeId>>()
        );
    }

    #[test]
    fn display_is_the_arena_position() {
        assert_eq!(Id::from_usize(7).to_string(), "7");
        assert_eq!(format!("{:?}", Id::from_usize(7)), "#7");
    }

    proptest! {
        #[test]
        fn index_round_trips(i in 0_usize..(u32::MAX as usize)) {
            prop_assert_eq!(Id::from_usize(i).idx(), i);
        }
    }
}
