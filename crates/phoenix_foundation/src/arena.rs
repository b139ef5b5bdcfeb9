//! Fixed-capacity arenas addressed by typed indices.
//!
//! Every dynamic structure built while compiling a net or parsing a sentence
//! lives in an [`Arena`]. Allocation appends and fails with an
//! [`ErrorKind::ArenaOverflow`](crate::ErrorKind::ArenaOverflow) once the
//! configured limit is reached. There is no individual deallocation; the
//! whole arena is cleared with [`Arena::reset`] between units of work.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;

use crate::error::{Capacity, Error, Result};

/// A typed index into an [`Arena`].
pub trait ArenaId: Copy + Eq {
    /// Builds an id from its raw index.
    fn from_raw(raw: u32) -> Self;

    /// The raw index of this id.
    fn raw(self) -> u32;

    /// The index as `usize`.
    fn index(self) -> usize {
        self.raw() as usize
    }
}

/// Declares a `u32` newtype implementing [`ArenaId`].
#[macro_export]
macro_rules! arena_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        $vis struct $name(u32);

        impl $crate::ArenaId for $name {
            fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            fn raw(self) -> u32 {
                self.0
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

/// A contiguous run of items allocated together, e.g. the children of an edge.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Span {
    start: u32,
    len: u32,
}

impl Span {
    /// The empty span.
    pub const EMPTY: Span = Span { start: 0, len: 0 };

    /// Number of items in the span.
    #[must_use]
    pub const fn len(self) -> usize {
        self.len as usize
    }

    /// Returns true if the span holds no items.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// Bump-allocated storage with a hard capacity.
pub struct Arena<I, T> {
    items: Vec<T>,
    capacity: Capacity,
    limit: usize,
    _id: PhantomData<fn() -> I>,
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates an empty arena that holds at most `limit` items.
    #[must_use]
    pub fn new(capacity: Capacity, limit: usize) -> Self {
        Self {
            items: Vec::with_capacity(limit.min(1024)),
            capacity,
            limit,
            _id: PhantomData,
        }
    }

    /// Appends an item, returning its id.
    ///
    /// # Errors
    ///
    /// Returns an arena overflow naming this arena's capacity when full.
    pub fn alloc(&mut self, item: T) -> Result<I> {
        let raw = self.next_raw(1)?;
        self.items.push(item);
        Ok(I::from_raw(raw))
    }

    /// Appends a run of items, returning the span that addresses them.
    ///
    /// # Errors
    ///
    /// Returns an arena overflow if the whole run does not fit; nothing is
    /// appended in that case.
    pub fn alloc_span(&mut self, items: &[T]) -> Result<Span>
    where
        T: Clone,
    {
        let start = self.next_raw(items.len())?;
        self.items.extend_from_slice(items);
        let len = u32::try_from(items.len())
            .map_err(|_| Error::arena_overflow(self.capacity, self.limit))?;
        Ok(Span { start, len })
    }

    fn next_raw(&self, count: usize) -> Result<u32> {
        if self.items.len() + count > self.limit {
            return Err(Error::arena_overflow(self.capacity, self.limit));
        }
        u32::try_from(self.items.len()).map_err(|_| Error::arena_overflow(self.capacity, self.limit))
    }

    /// Returns the item for an id, if it was allocated since the last reset.
    #[must_use]
    pub fn get(&self, id: I) -> Option<&T> {
        self.items.get(id.index())
    }

    /// Returns the item for an id mutably.
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.items.get_mut(id.index())
    }

    /// Returns the items addressed by a span.
    #[must_use]
    pub fn span(&self, span: Span) -> &[T] {
        let start = span.start as usize;
        self.items.get(start..start + span.len()).unwrap_or(&[])
    }

    /// Number of allocated items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The configured limit.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Which configured capacity bounds this arena.
    #[must_use]
    pub const fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Slots left before overflow.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.items.len())
    }

    /// Drops every item, keeping the allocation.
    pub fn reset(&mut self) {
        self.items.clear();
    }

    /// Drops items allocated after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    /// Iterates items with their ids in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| u32::try_from(i).ok().map(|raw| (I::from_raw(raw), item)))
    }

    /// All items in allocation order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        &self.items[id.index()]
    }
}

impl<I, T: fmt::Debug> fmt::Debug for Arena<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity)
            .field("limit", &self.limit)
            .field("len", &self.items.len())
            .finish()
    }
}

impl<I, T: Clone> Clone for Arena<I, T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            capacity: self.capacity,
            limit: self.limit,
            _id: PhantomData,
        }
    }
}
