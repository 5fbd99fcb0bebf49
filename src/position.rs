use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};

/// An address of a slot in a [`Deque`](crate::Deque)'s bucket array.
///
/// A position is a `(bucket, offset)` pair with `offset < K`. Positions are ordered as if all
/// buckets were laid out back to back in one flat array of `bucket_count * K` slots, and support
/// random-access arithmetic over that flat index space: `pos + n`, `pos - n`, `pos += n`,
/// `pos -= n` with a signed step, and `a - b` for the signed distance between two positions.
///
/// Positions are plain indices. They do not borrow the deque, and they stop denoting the same
/// element once the deque grows (which shifts every bucket index) or once that element is
/// removed. Every deque method that accepts a position checks it against the live range first.
///
/// # Examples
///
/// ```
/// use segdeque::Deque;
///
/// let mut d: Deque<i32, 4> = Deque::with_bucket_size();
/// d.extend(0..10);
///
/// let third = d.begin() + 3;
/// assert_eq!(d.get_at(third), Some(&3));
/// assert_eq!(d.end() - third, 7);
/// assert!(third < d.end());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position<const K: usize> {
    bucket: usize,
    offset: usize,
}

impl<const K: usize> Position<K> {
    pub(crate) const fn new(bucket: usize, offset: usize) -> Self {
        debug_assert!(offset < K);
        Self { bucket, offset }
    }

    /// The index of the bucket this position falls in.
    #[inline]
    pub fn bucket(&self) -> usize {
        self.bucket
    }

    /// The slot offset within the bucket, always less than `K`.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Moves the position by `step` slots, in either direction.
    ///
    /// Returns `None` if the result would fall before the first bucket or its bucket index would
    /// overflow.
    ///
    /// # Examples
    ///
    /// ```
    /// use segdeque::Deque;
    ///
    /// let d: Deque<u8, 4> = Deque::with_bucket_size();
    /// let mid = d.begin();
    /// assert_eq!((mid.bucket(), mid.offset()), (0, 2));
    ///
    /// let p = mid.checked_advance(7).unwrap();
    /// assert_eq!((p.bucket(), p.offset()), (2, 1));
    /// let q = p.checked_advance(-7).unwrap();
    /// assert_eq!(q, mid);
    /// assert_eq!(mid.checked_advance(-3), None);
    /// ```
    pub fn checked_advance(self, step: isize) -> Option<Self> {
        let k = K as isize;
        // floor division keeps negative steps on the right side of a bucket boundary
        let shifted = (self.offset as isize).checked_add(step)?;
        let bucket = (self.bucket as isize).checked_add(shifted.div_euclid(k))?;
        Some(Self {
            bucket: usize::try_from(bucket).ok()?,
            offset: shifted.rem_euclid(k) as usize,
        })
    }

    /// Moves the position by `step` slots, in either direction.
    ///
    /// # Panics
    ///
    /// Panics if the position would move before the first bucket.
    #[inline]
    pub fn advance(&mut self, step: isize) {
        *self = self
            .checked_advance(step)
            .expect("position moved outside the bucket array");
    }

    /// Steps to the next slot.
    #[inline]
    pub(crate) fn inc(&mut self) {
        self.offset += 1;
        if self.offset == K {
            self.bucket += 1;
            self.offset = 0;
        }
    }

    /// Steps to the previous slot. Must not be called on the very first slot.
    #[inline]
    pub(crate) fn dec(&mut self) {
        if self.offset == 0 {
            self.bucket -= 1;
            self.offset = K - 1;
        } else {
            self.offset -= 1;
        }
    }

    /// The same slot after `by` buckets were inserted in front of its bucket.
    #[inline]
    pub(crate) fn shift_buckets(self, by: usize) -> Self {
        Self {
            bucket: self.bucket + by,
            offset: self.offset,
        }
    }

    #[inline]
    pub(crate) fn is_first_slot(&self) -> bool {
        self.bucket == 0 && self.offset == 0
    }

    #[inline]
    pub(crate) fn is_last_slot(&self, bucket_count: usize) -> bool {
        self.bucket + 1 == bucket_count && self.offset == K - 1
    }
}

impl<const K: usize> Sub for Position<K> {
    type Output = isize;

    /// The signed number of slots from `rhs` to `self`.
    #[inline]
    fn sub(self, rhs: Self) -> isize {
        let buckets = self.bucket as isize - rhs.bucket as isize;
        buckets * K as isize + self.offset as isize - rhs.offset as isize
    }
}

impl<const K: usize> AddAssign<isize> for Position<K> {
    #[inline]
    fn add_assign(&mut self, step: isize) {
        self.advance(step);
    }
}

impl<const K: usize> SubAssign<isize> for Position<K> {
    #[inline]
    fn sub_assign(&mut self, step: isize) {
        self.advance(step.checked_neg().expect("position step overflow"));
    }
}

impl<const K: usize> Add<isize> for Position<K> {
    type Output = Self;

    #[inline]
    fn add(mut self, step: isize) -> Self {
        self += step;
        self
    }
}

impl<const K: usize> Sub<isize> for Position<K> {
    type Output = Self;

    #[inline]
    fn sub(mut self, step: isize) -> Self {
        self -= step;
        self
    }
}

impl<const K: usize> Ord for Position<K> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        (*self - *other).cmp(&0)
    }
}

impl<const K: usize> PartialOrd for Position<K> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const K: usize> fmt::Debug for Position<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({}:{})", self.bucket, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::Position;

    type P = Position<4>;

    #[test]
    fn step_across_buckets() {
        let mut p = P::new(1, 3);
        p.inc();
        assert_eq!((p.bucket(), p.offset()), (2, 0));
        p.dec();
        assert_eq!((p.bucket(), p.offset()), (1, 3));
        p.dec();
        p.dec();
        p.dec();
        p.dec();
        assert_eq!((p.bucket(), p.offset()), (0, 3));
    }

    #[test]
    fn advance_matches_repeated_steps() {
        let origin = P::new(5, 2);
        for step in -20isize..=20 {
            let mut walked = origin;
            for _ in 0..step.abs() {
                if step > 0 {
                    walked.inc();
                } else {
                    walked.dec();
                }
            }
            assert_eq!(origin + step, walked, "step {}", step);
            assert_eq!(walked - origin, step);
        }
    }

    #[test]
    fn negative_steps_land_on_bucket_edges() {
        let p = P::new(2, 0);
        assert_eq!(p - 1, P::new(1, 3));
        assert_eq!(p - 4, P::new(1, 0));
        assert_eq!(p - 5, P::new(0, 3));
        assert_eq!(P::new(1, 3) + 1, p);
    }

    #[test]
    fn advance_before_first_bucket() {
        assert_eq!(P::new(0, 1).checked_advance(-1), Some(P::new(0, 0)));
        assert_eq!(P::new(0, 1).checked_advance(-2), None);
        assert_eq!(P::new(0, 0).checked_advance(isize::MIN), None);
    }

    #[test]
    #[should_panic]
    fn sub_before_first_bucket() {
        let _ = P::new(0, 0) - 1;
    }

    #[test]
    fn order_follows_distance() {
        let ps = [P::new(0, 0), P::new(0, 3), P::new(1, 0), P::new(1, 2), P::new(3, 1)];
        for a in &ps {
            for b in &ps {
                assert_eq!(a.cmp(b), (*a - *b).cmp(&0));
                assert_eq!(a == b, *a - *b == 0);
            }
        }
        assert!(P::new(0, 3) < P::new(1, 0));
    }

    #[test]
    fn edges() {
        assert!(P::new(0, 0).is_first_slot());
        assert!(!P::new(1, 0).is_first_slot());
        assert!(P::new(2, 3).is_last_slot(3));
        assert!(!P::new(2, 3).is_last_slot(4));
        assert_eq!(P::new(0, 1).shift_buckets(3), P::new(3, 1));
    }
}
