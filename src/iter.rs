use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::slice;

use crate::bucket::Bucket;
use crate::position::Position;
use crate::Deque;

/// Splits the slots in `[front, back)` into per-bucket `(bucket, start, end)` runs.
pub(crate) fn runs<const K: usize>(
    front: Position<K>,
    back: Position<K>,
) -> impl DoubleEndedIterator<Item = (usize, usize, usize)> {
    let last = if front < back { back.bucket() + 1 } else { front.bucket() };
    (front.bucket()..last)
        .map(move |b| {
            let start = if b == front.bucket() { front.offset() } else { 0 };
            let end = if b == back.bucket() { back.offset() } else { K };
            (b, start, end)
        })
        .filter(|&(_, start, end)| start < end)
}

/// An iterator over the elements of a `Deque`.
///
/// This `struct` is created by the [`iter`] method on [`Deque`]. See its
/// documentation for more.
///
/// [`iter`]: struct.Deque.html#method.iter
/// [`Deque`]: struct.Deque.html
pub struct Iter<'a, T, const K: usize> {
    pub(super) buckets: &'a [Bucket<T, K>],
    pub(super) front: Position<K>,
    pub(super) back: Position<K>,
}

impl<'a, T, const K: usize> Iter<'a, T, K> {
    /// Splits off the first `index` remaining elements.
    #[cfg_attr(not(feature = "rayon"), allow(dead_code))]
    pub(crate) fn split_at(self, index: usize) -> (Self, Self) {
        debug_assert!(index <= self.len());
        let mid = self.front + index as isize;
        (
            Self {
                back: mid,
                ..self.clone()
            },
            Self { front: mid, ..self },
        )
    }
}

impl<'a, T, const K: usize> Clone for Iter<'a, T, K> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets,
            front: self.front,
            back: self.back,
        }
    }
}

impl<T: fmt::Debug, const K: usize> fmt::Debug for Iter<'_, T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.clone().collect::<alloc::vec::Vec<_>>()).finish()
    }
}

// Shared by `Iter` and `IterMut`; `$deref` turns a slot pointer into the yielded reference, and
// `$slice` a `(pointer, len)` run into the matching slice.
macro_rules! _impl {
    (bw, $deref:ident, $slice:path) => {
        #[inline]
        fn next_back(&mut self) -> Option<Self::Item> {
            if self.front == self.back {
                return None;
            }
            self.back.dec();
            Some(unsafe { $deref(self.buckets[self.back.bucket()].slot(self.back.offset())) })
        }

        fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
            if n >= self.len() {
                self.back = self.front;
                return None;
            }
            self.back -= n as isize;
            self.next_back()
        }

        fn rfold<Acc, F>(self, mut accum: Acc, mut f: F) -> Acc
        where
            F: FnMut(Acc, Self::Item) -> Acc,
        {
            for (b, start, end) in runs(self.front, self.back).rev() {
                let run = unsafe { $slice(self.buckets[b].slot(start), end - start) };
                accum = run.into_iter().rfold(accum, &mut f);
            }
            accum
        }
    };
    ($deref:ident, $slice:path) => {
        #[inline]
        fn next(&mut self) -> Option<Self::Item> {
            if self.front == self.back {
                return None;
            }
            // front < back <= the deque's end, so the slot is live
            let e = unsafe { $deref(self.buckets[self.front.bucket()].slot(self.front.offset())) };
            self.front.inc();
            Some(e)
        }

        #[inline]
        fn size_hint(&self) -> (usize, Option<usize>) {
            let len = (self.back - self.front) as usize;
            (len, Some(len))
        }

        fn nth(&mut self, n: usize) -> Option<Self::Item> {
            if n >= self.len() {
                self.front = self.back;
                return None;
            }
            self.front += n as isize;
            self.next()
        }

        fn fold<Acc, F>(self, mut accum: Acc, mut f: F) -> Acc
        where
            F: FnMut(Acc, Self::Item) -> Acc,
        {
            for (b, start, end) in runs(self.front, self.back) {
                // every slot of the run is live and handed out at most once
                let run = unsafe { $slice(self.buckets[b].slot(start), end - start) };
                accum = run.into_iter().fold(accum, &mut f);
            }
            accum
        }

        #[inline]
        fn count(self) -> usize {
            self.len()
        }

        #[inline]
        fn last(mut self) -> Option<Self::Item> {
            self.next_back()
        }
    };
}

#[inline]
unsafe fn slot_ref<'a, T>(p: *mut T) -> &'a T {
    &*p
}

#[inline]
unsafe fn slot_mut<'a, T>(p: *mut T) -> &'a mut T {
    &mut *p
}

#[inline]
unsafe fn run_ref<'a, T>(p: *mut T, len: usize) -> &'a [T] {
    slice::from_raw_parts(p, len)
}

#[inline]
unsafe fn run_mut<'a, T>(p: *mut T, len: usize) -> &'a mut [T] {
    slice::from_raw_parts_mut(p, len)
}

impl<'a, T, const K: usize> Iterator for Iter<'a, T, K> {
    type Item = &'a T;

    _impl!(slot_ref, run_ref);
}

impl<'a, T, const K: usize> DoubleEndedIterator for Iter<'a, T, K> {
    _impl!(bw, slot_ref, run_ref);
}

impl<T, const K: usize> ExactSizeIterator for Iter<'_, T, K> {}

impl<T, const K: usize> FusedIterator for Iter<'_, T, K> {}

/// A mutable iterator over the elements of a `Deque`.
///
/// This `struct` is created by the [`iter_mut`] method on [`Deque`]. See its
/// documentation for more.
///
/// [`iter_mut`]: struct.Deque.html#method.iter_mut
/// [`Deque`]: struct.Deque.html
pub struct IterMut<'a, T, const K: usize> {
    pub(super) buckets: &'a [Bucket<T, K>],
    pub(super) front: Position<K>,
    pub(super) back: Position<K>,
    pub(super) _marker: PhantomData<&'a mut T>,
}

// Same as `&'a mut [T]`: the remaining range is borrowed exclusively.
unsafe impl<T: Send, const K: usize> Send for IterMut<'_, T, K> {}
unsafe impl<T: Sync, const K: usize> Sync for IterMut<'_, T, K> {}

impl<'a, T, const K: usize> IterMut<'a, T, K> {
    /// Views the remaining elements through a shared iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let mut d: Deque<i32> = (1..=4).collect();
    /// let mut it = d.iter_mut();
    /// it.next();
    /// assert!(it.as_iter().copied().eq(2..=4));
    /// ```
    pub fn as_iter(&self) -> Iter<'_, T, K> {
        Iter {
            buckets: self.buckets,
            front: self.front,
            back: self.back,
        }
    }

    #[cfg_attr(not(feature = "rayon"), allow(dead_code))]
    pub(crate) fn split_at(self, index: usize) -> (Self, Self) {
        debug_assert!(index <= self.len());
        let mid = self.front + index as isize;
        (
            Self {
                buckets: self.buckets,
                front: self.front,
                back: mid,
                _marker: PhantomData,
            },
            Self { front: mid, ..self },
        )
    }
}

impl<T: fmt::Debug, const K: usize> fmt::Debug for IterMut<'_, T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IterMut").field(&self.as_iter()).finish()
    }
}

impl<'a, T, const K: usize> Iterator for IterMut<'a, T, K> {
    type Item = &'a mut T;

    _impl!(slot_mut, run_mut);
}

impl<'a, T, const K: usize> DoubleEndedIterator for IterMut<'a, T, K> {
    _impl!(bw, slot_mut, run_mut);
}

impl<T, const K: usize> ExactSizeIterator for IterMut<'_, T, K> {}

impl<T, const K: usize> FusedIterator for IterMut<'_, T, K> {}

/// An owning iterator over the elements of a `Deque`.
///
/// This `struct` is created by the [`into_iter`] method on [`Deque`]
/// (provided by the `IntoIterator` trait). See its documentation for more.
///
/// [`into_iter`]: struct.Deque.html#method.into_iter
/// [`Deque`]: struct.Deque.html
#[derive(Clone)]
pub struct IntoIter<T, const K: usize> {
    pub(super) inner: Deque<T, K>,
}

impl<T: fmt::Debug, const K: usize> fmt::Debug for IntoIter<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.inner).finish()
    }
}

impl<T, const K: usize> Iterator for IntoIter<T, K> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.inner.pop_front().ok()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.len();
        (len, Some(len))
    }

    #[inline]
    fn count(self) -> usize {
        self.inner.len()
    }
}

impl<T, const K: usize> DoubleEndedIterator for IntoIter<T, K> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.inner.pop_back().ok()
    }
}

impl<T, const K: usize> ExactSizeIterator for IntoIter<T, K> {}

impl<T, const K: usize> FusedIterator for IntoIter<T, K> {}

#[cfg(test)]
mod tests {
    use super::runs;
    use crate::position::Position;
    use std::vec::Vec;

    #[test]
    fn runs_cover_range() {
        let p = |b, o| Position::<4>::new(b, o);
        assert_eq!(runs(p(0, 2), p(0, 2)).count(), 0);
        assert_eq!(runs(p(0, 2), p(0, 3)).collect::<Vec<_>>(), [(0, 2, 3)]);
        assert_eq!(
            runs(p(0, 2), p(2, 0)).collect::<Vec<_>>(),
            [(0, 2, 4), (1, 0, 4)]
        );
        assert_eq!(
            runs(p(1, 3), p(3, 1)).rev().collect::<Vec<_>>(),
            [(3, 0, 1), (2, 0, 4), (1, 3, 4)]
        );
    }
}
