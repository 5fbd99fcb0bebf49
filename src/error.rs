use core::alloc::Layout;
use core::convert::Infallible;
use core::fmt;

/// Errors reported by the fallible [`Deque`](crate::Deque) operations.
///
/// The type parameter carries the failure of a caller-supplied element constructor (see
/// [`Deque::try_push_back_with`](crate::Deque::try_push_back_with)). Operations that never run
/// a constructor use the default, uninhabited `Infallible`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error<E = Infallible> {
    /// A checked access was made at `index` on a deque holding `len` elements.
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The length of the deque at the time of the access.
        len: usize,
    },
    /// An element was removed from an empty deque.
    EmptyContainer,
    /// A position outside the live range was handed to `insert` or `erase`.
    InvalidPosition,
    /// The bucket array would need more slots than fit in an `isize`.
    CapacityOverflow,
    /// The allocator refused to provide memory for `layout`.
    AllocError {
        /// The layout of the refused allocation.
        layout: Layout,
    },
    /// The element constructor failed; nothing was inserted.
    Construct(E),
}

impl Error {
    /// Re-types an error that cannot hold a construction failure.
    pub(crate) fn widen<E>(self) -> Error<E> {
        match self {
            Error::OutOfRange { index, len } => Error::OutOfRange { index, len },
            Error::EmptyContainer => Error::EmptyContainer,
            Error::InvalidPosition => Error::InvalidPosition,
            Error::CapacityOverflow => Error::CapacityOverflow,
            Error::AllocError { layout } => Error::AllocError { layout },
            Error::Construct(never) => match never {},
        }
    }

    /// Maps the error for an array of `n` values of type `V` whose allocation failed.
    pub(crate) fn array_of<V>(n: usize) -> Self {
        match Layout::array::<V>(n) {
            Ok(layout) => Error::AllocError { layout },
            Err(_) => Error::CapacityOverflow,
        }
    }
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfRange { index, len } => {
                write!(f, "index {} is out of range for deque of length {}", index, len)
            }
            Error::EmptyContainer => f.write_str("deque is empty"),
            Error::InvalidPosition => f.write_str("position is outside the live range"),
            Error::CapacityOverflow => f.write_str("capacity overflow"),
            Error::AllocError { layout } => write!(
                f,
                "memory allocation of {} bytes failed",
                layout.size()
            ),
            Error::Construct(e) => write!(f, "element construction failed: {}", e),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for Error<E> {}

/// Unwraps the result of an allocating operation the way `Vec` does: capacity overflow panics,
/// a refused allocation goes to the global allocation error handler.
pub(crate) fn handle_alloc<T>(result: Result<T, Error>) -> T {
    match result {
        Ok(v) => v,
        Err(Error::AllocError { layout }) => alloc::alloc::handle_alloc_error(layout),
        Err(Error::CapacityOverflow) => panic!("capacity overflow"),
        Err(e) => unreachable!("allocation reported a non-allocation error: {}", e),
    }
}
