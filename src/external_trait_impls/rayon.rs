//! This module contains the parallel iterator types for `Deque<T, K>`.
//! You will rarely need to interact with it directly
//! unless you have need to name one of the iterator types.
//!
//! Borrowing iterators split directly on bucket positions, so a split never copies or moves an
//! element. The owning iterator hands its elements over to a `Vec` first.

use crate::{iter, Deque};

use alloc::collections::LinkedList;
use alloc::vec::Vec;
use rayon_::iter::plumbing::*;
use rayon_::iter::*;

// NOTE: the following macros are lifted from
// https://github.com/rayon-rs/rayon/blob/44b641e7a8b664c47c35109195441a1e54f1c1b9/src/delegate.rs

/// Creates a parallel iterator implementation which simply wraps an inner type
/// and delegates all methods inward.  The actual struct must already be
/// declared with an `inner` field.
///
/// The implementation of `IntoParallelIterator` should be added separately.
macro_rules! delegate_iterator {
    ($iter:ty => $item:ty ,
     impl $( $args:tt )*
     ) => {
        impl $( $args )* ParallelIterator for $iter {
            type Item = $item;

            fn drive_unindexed<C>(self, consumer: C) -> C::Result
                where C: UnindexedConsumer<Self::Item>
            {
                self.inner.drive_unindexed(consumer)
            }

            fn opt_len(&self) -> Option<usize> {
                self.inner.opt_len()
            }
        }
    }
}

/// Creates an indexed parallel iterator implementation which simply wraps an
/// inner type and delegates all methods inward.  The actual struct must already
/// be declared with an `inner` field.
macro_rules! delegate_indexed_iterator {
    ($iter:ty => $item:ty ,
     impl $( $args:tt )*
     ) => {
        delegate_iterator!{
            $iter => $item ,
            impl $( $args )*
        }

        impl $( $args )* IndexedParallelIterator for $iter {
            fn drive<C>(self, consumer: C) -> C::Result
                where C: Consumer<Self::Item>
            {
                self.inner.drive(consumer)
            }

            fn len(&self) -> usize {
                self.inner.len()
            }

            fn with_producer<CB>(self, callback: CB) -> CB::Output
                where CB: ProducerCallback<Self::Item>
            {
                self.inner.with_producer(callback)
            }
        }
    }
}

/// Parallel iterator over a `Deque`
#[derive(Debug, Clone)]
pub struct IntoIter<T: Send> {
    inner: rayon_::vec::IntoIter<T>,
}

impl<T: Send, const K: usize> IntoParallelIterator for Deque<T, K> {
    type Item = T;
    type Iter = IntoIter<T>;

    fn into_par_iter(self) -> Self::Iter {
        IntoIter {
            inner: Vec::from(self).into_par_iter(),
        }
    }
}

delegate_indexed_iterator! {
    IntoIter<T> => T,
    impl<T: Send>
}

/// Parallel iterator over an immutable reference to a `Deque`
#[derive(Debug)]
pub struct Iter<'a, T: Sync, const K: usize> {
    inner: iter::Iter<'a, T, K>,
}

impl<'a, T: Sync, const K: usize> Clone for Iter<'a, T, K> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T: Sync, const K: usize> IntoParallelIterator for &'a Deque<T, K> {
    type Item = &'a T;
    type Iter = Iter<'a, T, K>;

    fn into_par_iter(self) -> Self::Iter {
        Iter { inner: self.iter() }
    }
}

impl<'a, T: Sync + 'a, const K: usize> ParallelIterator for Iter<'a, T, K> {
    type Item = &'a T;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        bridge(self, consumer)
    }

    fn opt_len(&self) -> Option<usize> {
        Some(self.inner.len())
    }
}

impl<'a, T: Sync + 'a, const K: usize> IndexedParallelIterator for Iter<'a, T, K> {
    fn drive<C>(self, consumer: C) -> C::Result
    where
        C: Consumer<Self::Item>,
    {
        bridge(self, consumer)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn with_producer<CB>(self, callback: CB) -> CB::Output
    where
        CB: ProducerCallback<Self::Item>,
    {
        callback.callback(IterProducer { inner: self.inner })
    }
}

struct IterProducer<'a, T, const K: usize> {
    inner: iter::Iter<'a, T, K>,
}

impl<'a, T: Sync + 'a, const K: usize> Producer for IterProducer<'a, T, K> {
    type Item = &'a T;
    type IntoIter = iter::Iter<'a, T, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner
    }

    fn split_at(self, index: usize) -> (Self, Self) {
        let (left, right) = self.inner.split_at(index);
        (IterProducer { inner: left }, IterProducer { inner: right })
    }
}

/// Parallel iterator over a mutable reference to a `Deque`
#[derive(Debug)]
pub struct IterMut<'a, T: Send, const K: usize> {
    inner: iter::IterMut<'a, T, K>,
}

impl<'a, T: Send, const K: usize> IntoParallelIterator for &'a mut Deque<T, K> {
    type Item = &'a mut T;
    type Iter = IterMut<'a, T, K>;

    fn into_par_iter(self) -> Self::Iter {
        IterMut {
            inner: self.iter_mut(),
        }
    }
}

impl<'a, T: Send + 'a, const K: usize> ParallelIterator for IterMut<'a, T, K> {
    type Item = &'a mut T;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        bridge(self, consumer)
    }

    fn opt_len(&self) -> Option<usize> {
        Some(self.inner.len())
    }
}

impl<'a, T: Send + 'a, const K: usize> IndexedParallelIterator for IterMut<'a, T, K> {
    fn drive<C>(self, consumer: C) -> C::Result
    where
        C: Consumer<Self::Item>,
    {
        bridge(self, consumer)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn with_producer<CB>(self, callback: CB) -> CB::Output
    where
        CB: ProducerCallback<Self::Item>,
    {
        callback.callback(IterMutProducer { inner: self.inner })
    }
}

struct IterMutProducer<'a, T, const K: usize> {
    inner: iter::IterMut<'a, T, K>,
}

impl<'a, T: Send + 'a, const K: usize> Producer for IterMutProducer<'a, T, K> {
    type Item = &'a mut T;
    type IntoIter = iter::IterMut<'a, T, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner
    }

    fn split_at(self, index: usize) -> (Self, Self) {
        let (left, right) = self.inner.split_at(index);
        (IterMutProducer { inner: left }, IterMutProducer { inner: right })
    }
}

impl<T, const K: usize> FromParallelIterator<T> for Deque<T, K>
where
    T: Send,
{
    fn from_par_iter<I>(par_iter: I) -> Self
    where
        I: IntoParallelIterator<Item = T>,
    {
        Vec::from_par_iter(par_iter).into()
    }
}

// The ParallelExtend impl is basically
// https://github.com/rayon-rs/rayon/blob/f0d2e708216edae7386e5343a27efc3948ee9001/src/iter/extend.rs

impl<T, const K: usize> ParallelExtend<T> for Deque<T, K>
where
    T: Send,
{
    fn par_extend<I>(&mut self, par_iter: I)
    where
        I: IntoParallelIterator<Item = T>,
    {
        let list = par_iter
            .into_par_iter()
            .fold(Vec::new, |mut v, i| {
                v.push(i);
                v
            })
            .map(|item| {
                let mut list = LinkedList::new();
                list.push_back(item);
                list
            })
            .reduce(LinkedList::new, |mut list1, mut list2| {
                list1.append(&mut list2);
                list1
            });
        for vec in list {
            self.extend(vec);
        }
    }
}

impl<'a, T, const K: usize> ParallelExtend<&'a T> for Deque<T, K>
where
    T: 'a + Copy + Send + Sync,
{
    fn par_extend<I>(&mut self, par_iter: I)
    where
        I: IntoParallelIterator<Item = &'a T>,
    {
        self.par_extend(par_iter.into_par_iter().copied())
    }
}
