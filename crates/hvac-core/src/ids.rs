use core::fmt;
use core::num::NonZeroU32;

/// Stable handle for a node or connection in a duct network.
///
/// Stored as `index + 1` in a `NonZeroU32`, so `Option<Id>` costs nothing
/// extra. Ids come from an [`IdAllocator`] and are never handed out twice.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id(NonZeroU32);

impl Id {
    /// Build an id for a 0-based allocation index.
    pub fn from_index(index: u32) -> Self {
        // saturating_add keeps the stored value at least 1
        Self(NonZeroU32::new(index.saturating_add(1)).expect("stored value is at least 1"))
    }

    /// The 0-based allocation index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.index(), f)
    }
}

pub type NodeId = Id;
pub type ConnectionId = Id;

/// Monotonic id source. One allocator per id space.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Ids are never recycled, even after the thing they named is removed.
    pub fn allocate(&mut self) -> Id {
        let id = Id::from_index(self.next);
        self.next = self.next.saturating_add(1);
        id
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u32 {
        self.next
    }
}
