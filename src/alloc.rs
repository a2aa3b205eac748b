//! Fallible buffer allocation.
//!
//! Every buffer of a construction goes through [`try_vec`], so running out of
//! memory surfaces as [`OpmphmError::OutOfMemory`] instead of an abort. Unit
//! tests can make the k-th allocation fail through [`failpoint`].

use crate::error::OpmphmError;

/// Allocates a vector of `len` copies of `value`.
pub(crate) fn try_vec<T: Clone>(len: usize, value: T) -> Result<Vec<T>, OpmphmError> {
    let bytes = len.saturating_mul(size_of::<T>());
    #[cfg(test)]
    failpoint::check(bytes)?;
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| OpmphmError::OutOfMemory { bytes })?;
    v.resize(len, value);
    Ok(v)
}

/// Allocates an empty vector able to hold `capacity` elements without reallocating.
pub(crate) fn try_with_capacity<T>(capacity: usize) -> Result<Vec<T>, OpmphmError> {
    let bytes = capacity.saturating_mul(size_of::<T>());
    #[cfg(test)]
    failpoint::check(bytes)?;
    let mut v = Vec::new();
    v.try_reserve_exact(capacity)
        .map_err(|_| OpmphmError::OutOfMemory { bytes })?;
    Ok(v)
}

#[cfg(test)]
pub(crate) mod failpoint {
    use super::OpmphmError;
    use std::cell::Cell;

    thread_local! {
        static COUNTDOWN: Cell<Option<usize>> = const { Cell::new(None) };
        static SEEN: Cell<usize> = const { Cell::new(0) };
    }

    /// Fail the allocation with zero-based index `nth`, counted from now.
    pub(crate) fn arm(nth: usize) {
        COUNTDOWN.with(|c| c.set(Some(nth)));
        SEEN.with(|s| s.set(0));
    }

    pub(crate) fn disarm() {
        COUNTDOWN.with(|c| c.set(None));
    }

    /// Number of allocations since the last `arm` or `count`.
    pub(crate) fn seen() -> usize {
        SEEN.with(|s| s.get())
    }

    /// Start counting allocations without failing any.
    pub(crate) fn count() {
        COUNTDOWN.with(|c| c.set(None));
        SEEN.with(|s| s.set(0));
    }

    pub(super) fn check(bytes: usize) -> Result<(), OpmphmError> {
        SEEN.with(|s| s.set(s.get() + 1));
        COUNTDOWN.with(|c| match c.get() {
            Some(0) => {
                c.set(None);
                Err(OpmphmError::OutOfMemory { bytes })
            }
            Some(k) => {
                c.set(Some(k - 1));
                Ok(())
            }
            None => Ok(()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_vec_fills() {
        let v = try_vec(5, 7u32).unwrap();
        assert_eq!(v, vec![7; 5]);
        assert_eq!(v.capacity(), 5);
    }

    #[test]
    fn impossible_request_is_reported() {
        let err = try_with_capacity::<u64>(usize::MAX).unwrap_err();
        assert!(matches!(err, OpmphmError::OutOfMemory { .. }));
    }

    #[test]
    fn failpoint_hits_requested_allocation() {
        failpoint::arm(1);
        assert!(try_vec(1, 0u8).is_ok());
        assert!(try_vec(1, 0u8).is_err());
        assert!(try_vec(1, 0u8).is_ok());
        assert_eq!(failpoint::seen(), 3);
        failpoint::disarm();
    }
}
