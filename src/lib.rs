//! A double-ended queue built from fixed-size buckets that never moves its elements.
//!
//! `VecDeque` keeps its elements in one ring buffer, so every time it runs out of room it
//! allocates a bigger buffer and moves every element over. [`Deque`] instead stores elements in
//! _buckets_: fixed-size blocks of `K` slots each, reached through a small array of bucket
//! handles. When the deque runs out of room at either end, only that handle array is rebuilt:
//! it grows to three times its size, the existing buckets are moved (by handle, not by element)
//! into its middle third, and fresh buckets are allocated for the two outer thirds. Elements
//! already in the deque stay exactly where they are.
//!
//! This gives you:
//!
//!  - Amortized `O(1)` pushes and pops at both ends, with equal headroom at the front and at the
//!    back after every growth.
//!  - `O(1)` indexed access: an index is turned into a `(bucket, offset)` [`Position`] with one
//!    division.
//!  - Growth cost proportional to the number of _buckets_, not the number of elements.
//!  - No memory is ever given back before the deque is dropped. Popping does not shrink.
//!
//! The bucket size is the const parameter `K` and defaults to [`DEFAULT_BUCKET_SIZE`]. Large
//! buckets make growth rare; small buckets waste less memory on nearly empty deques.
//!
//! ```
//! use segdeque::{Deque, Error};
//!
//! let mut d: Deque<i32> = Deque::new();
//! d.push_back(1);
//! d.push_back(2);
//! d.push_front(0);
//! assert_eq!(d, vec![0, 1, 2]);
//!
//! d.erase(d.begin() + 1).unwrap();
//! assert_eq!(d, vec![0, 2]);
//! d.insert(d.begin() + 1, 9).unwrap();
//! assert_eq!(d, vec![0, 9, 2]);
//!
//! assert_eq!(d.at(3), Err(Error::OutOfRange { index: 3, len: 3 }));
//! ```
//!
//! # Failure
//!
//! Removing from an empty deque and checked out-of-range access are reported through
//! [`Error`]. The `push_*` methods treat allocation failure the way `Vec` does (panic on capacity
//! overflow, abort through `handle_alloc_error` otherwise), while the `try_push_*` variants
//! report it, and leave the deque untouched when they do. Growth is all-or-nothing: every new
//! bucket is allocated before any existing state is modified.
//!
//! # Logging
//!
//! Growth events are reported at `debug` level, and refused allocations at `warn` level, through
//! the [`log`](https://docs.rs/log) facade. Nothing is printed unless the application installs a
//! logger.

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rustdoc::broken_intra_doc_links)]

#[cfg(test)]
#[macro_use]
extern crate std;

#[cfg_attr(test, macro_use)]
extern crate alloc;

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::repeat_with;
use core::marker::PhantomData;
use core::mem;
use core::ops::{Index, IndexMut};
use core::ptr;

use alloc::vec::Vec;

mod bucket;
mod error;
mod external_trait_impls;
mod iter;
mod position;

use bucket::Bucket;
pub use error::Error;
pub use position::Position;

/// Iterator types for [`Deque`].
pub mod deque {
    pub use super::iter::*;
}

/// Parallel iterator types for [`Deque`], enabled by the `rayon` feature.
#[cfg(feature = "rayon")]
pub mod rayon {
    pub use crate::external_trait_impls::rayon::*;
}

/// The number of slots per bucket used by [`Deque::new`].
#[cfg(not(miri))]
pub const DEFAULT_BUCKET_SIZE: usize = 10_000;
/// The number of slots per bucket used by [`Deque::new`].
#[cfg(miri)]
pub const DEFAULT_BUCKET_SIZE: usize = 16;

/// A double-ended queue that stores its elements in fixed-size buckets of `K` slots.
///
/// See the [crate-level documentation] for details.
///
/// [crate-level documentation]: index.html
pub struct Deque<T, const K: usize = DEFAULT_BUCKET_SIZE> {
    buckets: Vec<Bucket<T, K>>,
    // The live elements are exactly the slots in [begin, end). `end` always addresses an
    // allocated slot, so the last slot of the last bucket only fills up after a growth.
    begin: Position<K>,
    end: Position<K>,
    _marker: PhantomData<T>,
}

impl<T: Clone, const K: usize> Clone for Deque<T, K> {
    fn clone(&self) -> Self {
        error::handle_alloc(self.try_clone())
    }

    /// Replaces the contents of `self` with a copy of `source`.
    ///
    /// The copy is built completely before `self` is touched, so if cloning an element panics,
    /// `self` keeps its old contents.
    fn clone_from(&mut self, source: &Self) {
        let mut copy = source.clone();
        mem::swap(self, &mut copy);
    }
}

impl<T, const K: usize> Default for Deque<T, K> {
    /// Creates an empty `Deque<T, K>`.
    #[inline]
    fn default() -> Self {
        Self::with_bucket_size()
    }
}

impl<T> Deque<T> {
    /// Creates an empty `Deque` with the default bucket size.
    ///
    /// One bucket is allocated up front, and both ends start in its middle.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let deque: Deque<u32> = Deque::new();
    /// assert!(deque.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_bucket_size()
    }
}

impl<T, const K: usize> Deque<T, K> {
    const VALID_BUCKET_SIZE: () = assert!(
        K > 0 && K <= isize::MAX as usize,
        "bucket size must be in 1..=isize::MAX"
    );

    /// Creates an empty `Deque` with buckets of `K` slots.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let deque = Deque::<u32, 64>::with_bucket_size();
    /// assert_eq!(deque.capacity(), 64);
    /// ```
    pub fn with_bucket_size() -> Self {
        error::handle_alloc(Self::try_new())
    }

    /// Creates an empty `Deque`, reporting allocation failure instead of aborting.
    pub fn try_new() -> Result<Self, Error> {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_BUCKET_SIZE;

        let mut buckets = bucket::try_array(1)?;
        bucket::try_fill(&mut buckets, 1)?;
        let middle = Position::new(0, K / 2);
        Ok(Self {
            buckets,
            begin: middle,
            end: middle,
            _marker: PhantomData,
        })
    }

    /// Creates a `Deque` holding `len` default values.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let deque: Deque<u8> = Deque::with_len(3);
    /// assert_eq!(deque, vec![0, 0, 0]);
    /// ```
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        repeat_with(T::default).take(len).collect()
    }

    /// Creates a `Deque` holding `len` clones of `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let deque: Deque<_> = Deque::from_elem(3, 7);
    /// assert_eq!(deque, vec![7, 7, 7]);
    /// ```
    pub fn from_elem(len: usize, value: T) -> Self
    where
        T: Clone,
    {
        let mut deq = Self::with_bucket_size();
        if len > 0 {
            deq.extend(repeat_with(|| value.clone()).take(len - 1));
            deq.push_back(value);
        }
        deq
    }

    /// Returns a deep copy of the `Deque`, reporting allocation failure instead of aborting.
    ///
    /// The copy has the same number of buckets as `self`, with its elements at the same
    /// positions. If cloning an element panics, the elements cloned so far are dropped and all of
    /// the copy's memory is released.
    pub fn try_clone(&self) -> Result<Self, Error>
    where
        T: Clone,
    {
        let mut buckets = bucket::try_array(self.buckets.len())?;
        bucket::try_fill(&mut buckets, self.buckets.len())?;
        let mut copy = Self {
            buckets,
            begin: self.begin,
            end: self.begin,
            _marker: PhantomData,
        };
        for value in self.iter() {
            // same geometry as `self`, so `copy.end` never passes `self.end`
            unsafe { copy.slot(copy.end).write(value.clone()) };
            copy.end.inc();
        }
        Ok(copy)
    }

    /// Returns the number of elements in the `Deque`.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let mut v: Deque<i32> = Deque::new();
    /// assert_eq!(v.len(), 0);
    /// v.push_back(1);
    /// assert_eq!(v.len(), 1);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        (self.end - self.begin) as usize
    }

    /// Returns `true` if the `Deque` is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Returns the total number of slots across all allocated buckets.
    ///
    /// Because growth keeps headroom at both ends, a deque may grow before `len()` reaches
    /// `capacity()`.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.len() * K
    }

    /// Returns the number of allocated buckets.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the position of the first element (or of `end()` if the deque is empty).
    #[inline]
    pub fn begin(&self) -> Position<K> {
        self.begin
    }

    /// Returns the position one past the last element.
    #[inline]
    pub fn end(&self) -> Position<K> {
        self.end
    }

    /// Returns the position of the element at `index`.
    ///
    /// The result is not checked against the live range; use [`get_at`](Self::get_at) or
    /// [`index_of`](Self::index_of) to find out whether it denotes an element.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit in an `isize`.
    #[inline]
    pub fn position(&self, index: usize) -> Position<K> {
        self.begin + isize::try_from(index).expect("index overflow")
    }

    /// Returns the index of the element at `pos`, or `None` if `pos` is not in the live range.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let d: Deque<_> = Deque::from_elem(4, 'x');
    /// assert_eq!(d.index_of(d.begin() + 2), Some(2));
    /// assert_eq!(d.index_of(d.end()), None);
    /// ```
    #[inline]
    pub fn index_of(&self, pos: Position<K>) -> Option<usize> {
        if self.begin <= pos && pos < self.end {
            Some((pos - self.begin) as usize)
        } else {
            None
        }
    }

    /// Provides a reference to the element at `pos`, or `None` if `pos` is not in the live range.
    pub fn get_at(&self, pos: Position<K>) -> Option<&T> {
        self.index_of(pos)?;
        // pos is in [begin, end)
        Some(unsafe { &*self.slot(pos) })
    }

    /// Provides a mutable reference to the element at `pos`, or `None` if `pos` is not in the
    /// live range.
    pub fn get_at_mut(&mut self, pos: Position<K>) -> Option<&mut T> {
        self.index_of(pos)?;
        Some(unsafe { &mut *self.slot(pos) })
    }

    /// Provides a reference to the element at the given index.
    ///
    /// Element at index 0 is the front of the queue.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let mut buf: Deque<i32> = Deque::new();
    /// buf.push_back(3);
    /// buf.push_back(4);
    /// buf.push_back(5);
    /// assert_eq!(buf.get(1), Some(&4));
    /// assert_eq!(buf.get(3), None);
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len() {
            Some(unsafe { self.get_unchecked(index) })
        } else {
            None
        }
    }

    /// Provides a mutable reference to the element at the given index.
    ///
    /// Element at index 0 is the front of the queue.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len() {
            Some(unsafe { self.get_unchecked_mut(index) })
        } else {
            None
        }
    }

    /// Provides a reference to the element at the given index, or an [`Error::OutOfRange`] if
    /// there is none.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::{Deque, Error};
    ///
    /// let d: Deque<_> = Deque::from_elem(2, "a");
    /// assert_eq!(d.at(1), Ok(&"a"));
    /// assert_eq!(d.at(2), Err(Error::OutOfRange { index: 2, len: 2 }));
    /// ```
    pub fn at(&self, index: usize) -> Result<&T, Error> {
        let len = self.len();
        self.get(index).ok_or(Error::OutOfRange { index, len })
    }

    /// Provides a mutable reference to the element at the given index, or an
    /// [`Error::OutOfRange`] if there is none.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, Error> {
        let len = self.len();
        self.get_mut(index).ok_or(Error::OutOfRange { index, len })
    }

    /// Provides a reference to the element at the given index without checking it against the
    /// length.
    ///
    /// # Safety
    ///
    /// `index` must be less than `self.len()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len());
        &*self.slot(self.begin + index as isize)
    }

    /// Provides a mutable reference to the element at the given index without checking it
    /// against the length.
    ///
    /// # Safety
    ///
    /// `index` must be less than `self.len()`.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len());
        &mut *self.slot(self.begin + index as isize)
    }

    /// Provides a reference to the front element, or `None` if the `Deque` is empty.
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Provides a mutable reference to the front element, or `None` if the `Deque` is empty.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// Provides a reference to the back element, or `None` if the `Deque` is empty.
    pub fn back(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Provides a mutable reference to the back element, or `None` if the `Deque` is empty.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.len().checked_sub(1).and_then(move |i| self.get_mut(i))
    }

    /// Swaps elements at indices `i` and `j`.
    ///
    /// `i` and `j` may be equal.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let mut buf: Deque<_> = vec![3, 4, 5].into();
    /// buf.swap(0, 2);
    /// assert_eq!(buf, vec![5, 4, 3]);
    /// ```
    pub fn swap(&mut self, i: usize, j: usize) {
        let len = self.len();
        assert!(i < len, "swap index (is {}) should be < len (is {})", i, len);
        assert!(j < len, "swap index (is {}) should be < len (is {})", j, len);
        let (a, b) = (self.position(i), self.position(j));
        // both slots are live; ptr::swap allows them to be the same slot
        unsafe { ptr::swap(self.slot(a), self.slot(b)) };
    }

    /// Returns `true` if the `Deque` contains an element equal to the given value.
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq<T>,
    {
        self.iter().any(|e| e == x)
    }

    /// Returns a front-to-back iterator.
    ///
    /// Iterate back-to-front with `.rev()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let buf: Deque<_> = vec![5, 3, 4].into();
    /// let b: &[_] = &[&5, &3, &4];
    /// let c: Vec<&i32> = buf.iter().collect();
    /// assert_eq!(&c[..], b);
    /// assert!(buf.iter().rev().eq(&[4, 3, 5]));
    /// ```
    pub fn iter(&self) -> iter::Iter<'_, T, K> {
        iter::Iter {
            buckets: &self.buckets,
            front: self.begin,
            back: self.end,
        }
    }

    /// Returns a front-to-back iterator that returns mutable references.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let mut buf: Deque<_> = vec![5, 3, 4].into();
    /// for num in buf.iter_mut() {
    ///     *num = *num - 2;
    /// }
    /// assert_eq!(buf, vec![3, 1, 2]);
    /// ```
    pub fn iter_mut(&mut self) -> iter::IterMut<'_, T, K> {
        iter::IterMut {
            buckets: &self.buckets,
            front: self.begin,
            back: self.end,
            _marker: PhantomData,
        }
    }

    /// Appends an element to the back of the `Deque`.
    ///
    /// # Panics
    ///
    /// Panics if the number of slots overflows an `isize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let mut buf: Deque<i32> = Deque::new();
    /// buf.push_back(1);
    /// buf.push_back(3);
    /// assert_eq!(3, *buf.back().unwrap());
    /// ```
    pub fn push_back(&mut self, value: T) {
        error::handle_alloc(self.try_push_back(value))
    }

    /// Prepends an element to the front of the `Deque`.
    ///
    /// # Panics
    ///
    /// Panics if the number of slots overflows an `isize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let mut d: Deque<i32> = Deque::new();
    /// d.push_front(1);
    /// d.push_front(2);
    /// assert_eq!(d.front(), Some(&2));
    /// ```
    pub fn push_front(&mut self, value: T) {
        error::handle_alloc(self.try_push_front(value))
    }

    /// Appends an element to the back of the `Deque`, reporting allocation failure.
    ///
    /// On failure the deque is unchanged and `value` is dropped.
    pub fn try_push_back(&mut self, value: T) -> Result<(), Error> {
        self.try_push_back_with(|| Ok(value))
    }

    /// Prepends an element to the front of the `Deque`, reporting allocation failure.
    ///
    /// On failure the deque is unchanged and `value` is dropped.
    pub fn try_push_front(&mut self, value: T) -> Result<(), Error> {
        self.try_push_front_with(|| Ok(value))
    }

    /// Constructs an element directly in the slot after the back of the `Deque`.
    ///
    /// `f` is called before any room is made, so if it fails its error is returned as
    /// [`Error::Construct`] and the deque is left exactly as it was (no growth happens, and
    /// positions held by the caller stay valid). If the element is built but the deque cannot
    /// grow to hold it, the element is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::{Deque, Error};
    ///
    /// let mut d: Deque<u8> = Deque::new();
    /// d.try_push_back_with(|| "7".parse::<u8>()).unwrap();
    /// assert!(matches!(
    ///     d.try_push_back_with(|| "x".parse::<u8>()),
    ///     Err(Error::Construct(_))
    /// ));
    /// assert_eq!(d, vec![7]);
    /// ```
    pub fn try_push_back_with<E, F>(&mut self, f: F) -> Result<(), Error<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let value = f().map_err(Error::Construct)?;
        if self.end.is_last_slot(self.buckets.len()) {
            self.grow().map_err(Error::widen)?;
        }
        // end addresses an allocated, uninitialized slot
        unsafe { self.slot(self.end).write(value) };
        self.end.inc();
        Ok(())
    }

    /// Constructs an element directly in the slot before the front of the `Deque`.
    ///
    /// See [`try_push_back_with`](Self::try_push_back_with).
    pub fn try_push_front_with<E, F>(&mut self, f: F) -> Result<(), Error<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let value = f().map_err(Error::Construct)?;
        if self.begin.is_first_slot() {
            self.grow().map_err(Error::widen)?;
        }
        let mut begin = self.begin;
        begin.dec();
        unsafe { self.slot(begin).write(value) };
        self.begin = begin;
        Ok(())
    }

    /// Removes the last element and returns it, or [`Error::EmptyContainer`] if the `Deque` is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::{Deque, Error};
    ///
    /// let mut buf: Deque<i32> = Deque::new();
    /// assert_eq!(buf.pop_back(), Err(Error::EmptyContainer));
    /// buf.push_back(1);
    /// buf.push_back(3);
    /// assert_eq!(buf.pop_back(), Ok(3));
    /// ```
    pub fn pop_back(&mut self) -> Result<T, Error> {
        if self.is_empty() {
            return Err(Error::EmptyContainer);
        }
        self.end.dec();
        // the slot was live and is now outside [begin, end)
        Ok(unsafe { self.slot(self.end).read() })
    }

    /// Removes the first element and returns it, or [`Error::EmptyContainer`] if the `Deque` is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::{Deque, Error};
    ///
    /// let mut d: Deque<i32> = Deque::new();
    /// d.push_back(1);
    /// d.push_back(2);
    ///
    /// assert_eq!(d.pop_front(), Ok(1));
    /// assert_eq!(d.pop_front(), Ok(2));
    /// assert_eq!(d.pop_front(), Err(Error::EmptyContainer));
    /// ```
    pub fn pop_front(&mut self) -> Result<T, Error> {
        if self.is_empty() {
            return Err(Error::EmptyContainer);
        }
        let value = unsafe { self.slot(self.begin).read() };
        self.begin.inc();
        Ok(value)
    }

    /// Inserts `value` at `pos`, shifting the element at `pos` and everything after it one slot
    /// towards the back. Returns the position of the inserted element.
    ///
    /// `pos` may be anything from `begin()` to `end()` inclusive. The value is pushed to the back
    /// and then swapped backwards into place, so this takes time proportional to the distance
    /// between `pos` and the back. Positions obtained before the call may not denote the same
    /// elements afterwards, since the push may grow the deque.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let mut d: Deque<_> = vec!['a', 'b', 'c'].into();
    /// let at = d.insert(d.begin() + 1, 'd').unwrap();
    /// assert_eq!(d.get_at(at), Some(&'d'));
    /// assert_eq!(d, vec!['a', 'd', 'b', 'c']);
    /// ```
    pub fn insert(&mut self, pos: Position<K>, value: T) -> Result<Position<K>, Error> {
        if pos < self.begin || pos > self.end {
            return Err(Error::InvalidPosition);
        }
        // positions move on growth, the index does not
        let index = pos - self.begin;
        self.try_push_back(value)?;

        let target = self.begin + index;
        let mut cur = self.end - 1;
        while cur != target {
            let mut prev = cur;
            prev.dec();
            unsafe { ptr::swap(self.slot(prev), self.slot(cur)) };
            cur = prev;
        }
        Ok(target)
    }

    /// Removes and returns the element at `pos`, shifting everything after it one slot towards
    /// the front.
    ///
    /// This takes time proportional to the distance between `pos` and the back.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::{Deque, Error};
    ///
    /// let mut buf: Deque<_> = vec![1, 2, 3].into();
    /// assert_eq!(buf.erase(buf.begin() + 1), Ok(2));
    /// assert_eq!(buf, vec![1, 3]);
    /// assert_eq!(buf.erase(buf.end()), Err(Error::InvalidPosition));
    /// ```
    pub fn erase(&mut self, pos: Position<K>) -> Result<T, Error> {
        if self.is_empty() {
            return Err(Error::EmptyContainer);
        }
        if self.index_of(pos).is_none() {
            return Err(Error::InvalidPosition);
        }

        let last = self.end - 1;
        let mut cur = pos;
        while cur != last {
            let mut next = cur;
            next.inc();
            unsafe { ptr::swap(self.slot(cur), self.slot(next)) };
            cur = next;
        }
        self.pop_back()
    }

    /// Shortens the `Deque`, keeping the first `len` elements and dropping the rest.
    ///
    /// If `len` is greater than the `Deque`'s current length, this has no effect. No memory is
    /// released.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let mut buf: Deque<_> = vec![5, 10, 15].into();
    /// buf.truncate(1);
    /// assert_eq!(buf, vec![5]);
    /// ```
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len() {
            return;
        }
        let new_end = self.position(len);
        // Shrink the live range first: a panicking destructor then leaks the rest of the tail
        // instead of leaving dropped elements in the live range.
        let old_end = mem::replace(&mut self.end, new_end);
        for (b, start, end) in iter::runs(new_end, old_end) {
            unsafe {
                let run = self.buckets[b].slot(start);
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(run, end - start));
            }
        }
    }

    /// Clears the `Deque`, removing all values. The buckets stay allocated.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Returns a pointer to the slot at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is past the last bucket.
    #[inline]
    fn slot(&self, pos: Position<K>) -> *mut T {
        // positions always keep their offset below K
        unsafe { self.buckets[pos.bucket()].slot(pos.offset()) }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Growth
////////////////////////////////////////////////////////////////////////////////

impl<T, const K: usize> Deque<T, K> {
    /// Triples the bucket array, keeping the current buckets in its middle third.
    ///
    /// All new memory is acquired before the deque is modified; if any allocation fails, the
    /// partial allocations are released and the deque is left as it was.
    #[cold]
    #[inline(never)]
    fn grow(&mut self) -> Result<(), Error> {
        let old = self.buckets.len();
        let new = old
            .checked_mul(3)
            .filter(|&n| n.checked_mul(K).map_or(false, |slots| slots <= isize::MAX as usize))
            .ok_or(Error::CapacityOverflow)?;

        let mut grown = bucket::try_array(new)?;
        bucket::try_fill(&mut grown, old)?;
        let mut back = bucket::try_array(old)?;
        bucket::try_fill(&mut back, old)?;

        // Nothing below allocates: `grown` already has room for all `new` handles.
        grown.append(&mut self.buckets);
        grown.append(&mut back);
        debug_assert_eq!(grown.len(), new);
        self.buckets = grown;
        self.begin = self.begin.shift_buckets(old);
        self.end = self.end.shift_buckets(old);

        log::debug!(
            "grew bucket array from {} to {} buckets ({} slots each, {} live)",
            old,
            new,
            K,
            self.len()
        );
        Ok(())
    }
}

impl<T, const K: usize> Drop for Deque<T, K> {
    fn drop(&mut self) {
        // the buckets themselves are freed when `self.buckets` is dropped
        self.clear();
    }
}

impl<A: PartialEq, const K: usize> PartialEq for Deque<A, K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<A: Eq, const K: usize> Eq for Deque<A, K> {}

macro_rules! __impl_slice_eq1 {
    ($lhs:ty, $rhs:ty, $($constraints:tt)*) => {
        impl<A, B, const K: usize> PartialEq<$rhs> for $lhs
        where
            A: PartialEq<B>,
            $($constraints)*
        {
            fn eq(&self, other: &$rhs) -> bool {
                self.len() == other.len() && self.iter().eq(other.iter())
            }
        }
    }
}

__impl_slice_eq1! { Deque<A, K>, Vec<B>, }
__impl_slice_eq1! { Deque<A, K>, &[B], }
__impl_slice_eq1! { Deque<A, K>, &mut [B], }

// For symmetry:

macro_rules! __impl_slice_eq2 {
    ($lhs:ty, $rhs:ty, $($constraints:tt)*) => {
        impl<A, B, const K: usize> PartialEq<$lhs> for $rhs
        where
            A: PartialEq<B>,
            $($constraints)*
        {
            fn eq(&self, other: &$lhs) -> bool {
                other.len() == self.len() && other.iter().eq(self.iter())
            }
        }
    }
}

__impl_slice_eq2! { Deque<A, K>, Vec<B>, }
__impl_slice_eq2! { Deque<A, K>, &[B], }
__impl_slice_eq2! { Deque<A, K>, &mut [B], }

impl<A: PartialOrd, const K: usize> PartialOrd for Deque<A, K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<A: Ord, const K: usize> Ord for Deque<A, K> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<A: Hash, const K: usize> Hash for Deque<A, K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for e in self {
            e.hash(state);
        }
    }
}

impl<A, const K: usize> Index<usize> for Deque<A, K> {
    type Output = A;

    /// # Panics
    ///
    /// Panics if `index` is out of bounds. Use [`Deque::get_unchecked`] to skip the check.
    #[inline]
    fn index(&self, index: usize) -> &A {
        self.get(index).expect("Out of bounds access")
    }
}

impl<A, const K: usize> IndexMut<usize> for Deque<A, K> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut A {
        self.get_mut(index).expect("Out of bounds access")
    }
}

impl<A, const K: usize> FromIterator<A> for Deque<A, K> {
    fn from_iter<T: IntoIterator<Item = A>>(iter: T) -> Self {
        let mut deq = Self::with_bucket_size();
        deq.extend(iter);
        deq
    }
}

impl<T, const K: usize> IntoIterator for Deque<T, K> {
    type Item = T;
    type IntoIter = iter::IntoIter<T, K>;

    fn into_iter(self) -> iter::IntoIter<T, K> {
        iter::IntoIter { inner: self }
    }
}

impl<'a, T, const K: usize> IntoIterator for &'a Deque<T, K> {
    type Item = &'a T;
    type IntoIter = iter::Iter<'a, T, K>;

    fn into_iter(self) -> iter::Iter<'a, T, K> {
        self.iter()
    }
}

impl<'a, T, const K: usize> IntoIterator for &'a mut Deque<T, K> {
    type Item = &'a mut T;
    type IntoIter = iter::IterMut<'a, T, K>;

    fn into_iter(self) -> iter::IterMut<'a, T, K> {
        self.iter_mut()
    }
}

impl<A, const K: usize> Extend<A> for Deque<A, K> {
    fn extend<T: IntoIterator<Item = A>>(&mut self, iter: T) {
        iter.into_iter().for_each(move |v| self.push_back(v));
    }
}

impl<'a, T: 'a + Copy, const K: usize> Extend<&'a T> for Deque<T, K> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: fmt::Debug, const K: usize> fmt::Debug for Deque<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self).finish()
    }
}

impl<T, const K: usize> From<Vec<T>> for Deque<T, K> {
    fn from(other: Vec<T>) -> Self {
        other.into_iter().collect()
    }
}

impl<T, const K: usize> From<Deque<T, K>> for Vec<T> {
    fn from(other: Deque<T, K>) -> Self {
        let mut v = Vec::with_capacity(other.len());
        v.extend(other);
        v
    }
}
