//! Fixed-size blocks of element slots.
//!
//! A bucket is allocated whole, as raw memory, and never holds a constructed element on its
//! own: which of its slots are live is tracked entirely by the owning deque's `begin` and `end`
//! positions. Dropping a bucket frees its memory without touching any slot.

use core::alloc::Layout;
use core::marker::PhantomData;
use core::ptr::NonNull;

use alloc::alloc::{alloc, dealloc};
use alloc::vec::Vec;

use crate::Error;

pub(crate) struct Bucket<T, const K: usize> {
    ptr: NonNull<T>,
    _marker: PhantomData<T>,
}

// A bucket is a uniquely owned allocation, exactly like a `Box<[MaybeUninit<T>]>`.
unsafe impl<T: Send, const K: usize> Send for Bucket<T, K> {}
unsafe impl<T: Sync, const K: usize> Sync for Bucket<T, K> {}

impl<T, const K: usize> Bucket<T, K> {
    #[inline]
    fn layout() -> Result<Layout, Error> {
        Layout::array::<T>(K).map_err(|_| Error::CapacityOverflow)
    }

    /// Allocates `K` uninitialized slots.
    pub(crate) fn try_alloc() -> Result<Self, Error> {
        let layout = Self::layout()?;
        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            // layout has non-zero size
            let raw = unsafe { alloc(layout) };
            match NonNull::new(raw.cast::<T>()) {
                Some(ptr) => ptr,
                None => {
                    log::warn!("allocation of a {}-byte bucket failed", layout.size());
                    return Err(Error::AllocError { layout });
                }
            }
        };
        Ok(Self {
            ptr,
            _marker: PhantomData,
        })
    }

    /// Returns a pointer to the slot at `offset`.
    ///
    /// The pointer may be written through even though `self` is only borrowed shared: the slots
    /// live in a separate allocation. Whether the slot is initialized is up to the caller.
    ///
    /// # Safety
    ///
    /// `offset` must be less than `K`.
    #[inline]
    pub(crate) unsafe fn slot(&self, offset: usize) -> *mut T {
        debug_assert!(offset < K);
        self.ptr.as_ptr().add(offset)
    }
}

impl<T, const K: usize> Drop for Bucket<T, K> {
    fn drop(&mut self) {
        if let Ok(layout) = Self::layout() {
            if layout.size() != 0 {
                // allocated in try_alloc with this exact layout
                unsafe { dealloc(self.ptr.as_ptr().cast(), layout) };
            }
        }
    }
}

/// Creates an empty bucket array with room for exactly `capacity` bucket handles.
pub(crate) fn try_array<T, const K: usize>(capacity: usize) -> Result<Vec<Bucket<T, K>>, Error> {
    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(capacity)
        .map_err(|_| Error::array_of::<Bucket<T, K>>(capacity))?;
    Ok(buckets)
}

/// Appends `n` freshly allocated buckets to `buckets`, which must already have room for them.
///
/// On failure, the buckets appended so far remain in `buckets` and are freed with it.
pub(crate) fn try_fill<T, const K: usize>(
    buckets: &mut Vec<Bucket<T, K>>,
    n: usize,
) -> Result<(), Error> {
    debug_assert!(buckets.capacity() - buckets.len() >= n);
    for _ in 0..n {
        buckets.push(Bucket::try_alloc()?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_buckets_do_not_allocate() {
        let b = Bucket::<(), 8>::try_alloc().unwrap();
        assert_eq!(b.ptr, NonNull::dangling());
    }

    #[test]
    fn fill_reserved_array() {
        let mut buckets = try_array::<u64, 16>(3).unwrap();
        try_fill(&mut buckets, 3).unwrap();
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets.capacity(), 3);
        unsafe {
            buckets[1].slot(15).write(42);
            assert_eq!(buckets[1].slot(15).read(), 42);
        }
    }

    #[test]
    fn oversized_bucket_overflows() {
        assert_eq!(
            Bucket::<u64, { usize::MAX / 4 }>::try_alloc().err(),
            Some(Error::CapacityOverflow)
        );
    }
}
