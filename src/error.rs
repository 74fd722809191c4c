use std::alloc::{handle_alloc_error, Layout};
use std::{error::Error, fmt};

/// The error returned by [`CircularDeque::try_reserve`](crate::CircularDeque::try_reserve).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TryReserveError {
    /// The requested capacity can't be represented as an allocation layout.
    CapacityOverflow,
    /// The allocator refused to hand out a buffer of this layout.
    AllocError { layout: Layout },
}

impl TryReserveError {
    /// Turns the error into the failure mode of the infallible methods:
    /// a panic for overflow, the global alloc error handler otherwise.
    #[cold]
    pub(crate) fn bail(self) -> ! {
        match self {
            Self::CapacityOverflow => panic!("capacity overflow"),
            Self::AllocError { layout } => handle_alloc_error(layout),
        }
    }
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")?;
        match self {
            Self::CapacityOverflow => {
                f.write_str(" because the computed capacity exceeded the collection's maximum")
            }
            Self::AllocError { layout } => {
                write!(f, " because the allocator returned an error for {} bytes", layout.size())
            }
        }
    }
}

impl Error for TryReserveError {}
