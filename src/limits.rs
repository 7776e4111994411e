//! Resource limits for decoding.
//!
//! A GIF stream declares its canvas size up front and every composited frame is a full canvas
//! of RGBA pixels, so a tiny file can request a very large amount of memory. The decoder checks
//! each of its allocations against a [`Limits`] budget before performing it.

use crate::error::{GifError, GifResult, LimitErrorKind};

/// Resource limits for decoding.
///
/// Limits can be either *strict* or *non-strict*. Non-strict limits are best-effort limits where
/// the decoder tries to stay within them. The dimension limits are strict, the allocation limit
/// accounts for the composited frames and index buffers the decoder holds at any one time.
///
/// The default limits are a maximum of 512MiB of allocated memory and no dimension limits.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub struct Limits {
    /// The maximum allowed canvas width. This limit is strict. The default is no limit.
    pub max_image_width: Option<u32>,
    /// The maximum allowed canvas height. This limit is strict. The default is no limit.
    pub max_image_height: Option<u32>,
    /// The maximum allowed sum of allocations allocated by the decoder at any one time excluding
    /// allocator overhead. The default is 512MiB.
    pub max_alloc: Option<u64>,
}

/// Add some reasonable limits.
///
/// **Note**: This is not equivalent to _not_ adding limits. This may be changed in future major
/// version increases.
impl Default for Limits {
    fn default() -> Limits {
        Limits {
            max_image_width: None,
            max_image_height: None,
            max_alloc: Some(512 * 1024 * 1024),
        }
    }
}

impl Limits {
    /// Disable all limits.
    #[must_use]
    pub fn no_limits() -> Limits {
        Limits {
            max_image_width: None,
            max_image_height: None,
            max_alloc: None,
        }
    }

    /// This function checks the `max_image_width` and `max_image_height` limits given
    /// the image width and height.
    pub fn check_dimensions(&self, width: u32, height: u32) -> GifResult<()> {
        if let Some(max_width) = self.max_image_width {
            if width > max_width {
                return Err(GifError::limits(LimitErrorKind::DimensionError));
            }
        }

        if let Some(max_height) = self.max_image_height {
            if height > max_height {
                return Err(GifError::limits(LimitErrorKind::DimensionError));
            }
        }

        Ok(())
    }

    /// This function checks that the current limit allows for reserving the set amount
    /// of bytes, it then reduces the limit accordingly.
    pub fn reserve(&mut self, amount: u64) -> GifResult<()> {
        if let Some(max_alloc) = self.max_alloc.as_mut() {
            if *max_alloc < amount {
                return Err(GifError::limits(LimitErrorKind::InsufficientMemory));
            }

            *max_alloc -= amount;
        }

        Ok(())
    }

    /// This function acts identically to [`reserve`], but takes a `usize` for convenience.
    ///
    /// [`reserve`]: #method.reserve
    pub fn reserve_usize(&mut self, amount: usize) -> GifResult<()> {
        match u64::try_from(amount) {
            Ok(n) => self.reserve(n),
            Err(_) if self.max_alloc.is_some() => {
                Err(GifError::limits(LimitErrorKind::InsufficientMemory))
            }
            Err(_) => {
                // Out of bounds, but we weren't asked to consider any limit.
                Ok(())
            }
        }
    }

    /// Reserves the memory of an RGBA buffer of `width` by `height` pixels, after checking the
    /// dimension limits.
    pub fn reserve_rgba(&mut self, width: u32, height: u32) -> GifResult<()> {
        self.check_dimensions(width, height)?;
        let in_memory_size = u64::from(width)
            .saturating_mul(u64::from(height))
            .saturating_mul(4);
        self.reserve(in_memory_size)
    }

    /// This function increases the `max_alloc` limit with amount. Should only be used
    /// together with [`reserve`].
    ///
    /// [`reserve`]: #method.reserve
    pub fn free(&mut self, amount: u64) {
        if let Some(max_alloc) = self.max_alloc.as_mut() {
            *max_alloc = max_alloc.saturating_add(amount);
        }
    }

    /// This function acts identically to [`free`], but takes a `usize` for convenience.
    ///
    /// [`free`]: #method.free
    pub fn free_usize(&mut self, amount: usize) {
        if let Ok(n) = u64::try_from(amount) {
            self.free(n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Limits;
    use crate::error::{GifError, LimitErrorKind};

    #[test]
    fn dimensions_are_strict() {
        let mut limits = Limits::no_limits();
        limits.max_image_width = Some(10);
        assert!(limits.check_dimensions(10, 1000).is_ok());
        assert!(matches!(
            limits.check_dimensions(11, 1),
            Err(GifError::Limits {
                kind: LimitErrorKind::DimensionError
            })
        ));
    }

    #[test]
    fn reserve_and_free_balance() {
        let mut limits = Limits::no_limits();
        limits.max_alloc = Some(100);
        limits.reserve_rgba(5, 5).unwrap();
        assert_eq!(limits.max_alloc, Some(0));
        assert!(limits.reserve(1).is_err());
        limits.free(100);
        assert_eq!(limits.max_alloc, Some(100));
    }

    #[test]
    fn no_limits_never_fails() {
        let mut limits = Limits::no_limits();
        limits.reserve_rgba(u32::MAX, u32::MAX).unwrap();
        limits.reserve_usize(usize::MAX).unwrap();
    }
}
