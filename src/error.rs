//! Contains detailed error representation.
//!
//! See the main [`GifError`] which contains a variant for each class of failure. Decoding fails
//! fast: a [`GifError::Malformed`] or [`GifError::Unsupported`] error means that no frames are
//! available from the stream at all, and callers are expected to fall back to treating the
//! source as a static image.
//!
//! Running out of palette slots while encoding is never an error. Colors that do not fit are
//! mapped onto the nearest existing palette entry instead.
//!
//! [`GifError`]: enum.GifError.html

use core::fmt;
use std::io;

use snafu::prelude::*;

/// The generic error type for GIF operations.
#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum GifError {
    /// The input did not conform to the GIF container grammar.
    ///
    /// This covers a missing signature, blocks cut off by the end of the input, block size
    /// bytes that contradict the block type and corrupt compressed image data.
    #[snafu(display("Malformed GIF stream: {kind}"))]
    Malformed {
        /// What is wrong with the stream.
        kind: MalformedKind,
    },

    /// The input uses a part of the format that is recognized but not handled.
    ///
    /// Unknown extension blocks are skipped and never produce this error. It is reserved for
    /// core features, such as interlaced image data, where compositing correctness can not be
    /// guaranteed.
    #[snafu(display("Unsupported GIF feature: {feature}"))]
    Unsupported {
        /// A description of the feature.
        feature: String,
    },

    /// An error was encountered in input arguments.
    #[snafu(display("Invalid parameter: {kind}"))]
    Parameter {
        /// Which parameter is wrong.
        kind: ParameterErrorKind,
    },

    /// Completing the operation would have required more resources than allowed.
    ///
    /// Errors of this type are limits set by the user, *not* inherent in the format.
    #[snafu(display("Limit exceeded: {kind}"))]
    Limits {
        /// The limit that was hit.
        kind: LimitErrorKind,
    },

    /// An error occurred while writing the encoded stream.
    #[snafu(display("I/O error while writing GIF data"))]
    Io {
        /// The error of the underlying writer.
        source: io::Error,
    },
}

/// Details how a stream is malformed.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum MalformedKind {
    /// The stream does not start with `GIF87a` or `GIF89a`.
    Signature,
    /// The input ended in the middle of a block.
    UnexpectedEof,
    /// A block declared a size that is not valid for its type.
    InvalidBlockSize {
        /// The label of the block, e.g. `0xF9` for graphic control.
        block: u8,
        /// The size byte that was found.
        found: u8,
    },
    /// The LZW minimum code size is outside of `1..=8`.
    InvalidCodeSize(u8),
    /// A frame references neither a local nor a global color table.
    MissingColorTable,
    /// The compressed image data could not be decompressed.
    Lzw(String),
}

/// Details how a parameter is malformed.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParameterErrorKind {
    /// The dimensions passed are wrong.
    DimensionMismatch,
    /// Repeated an operation for which error that could not be cloned was emitted already.
    FailedAlready,
    /// The palette indices of a frame do not fit the code size chosen for it.
    IndexOutOfRange {
        /// The largest index found.
        index: u8,
        /// The LZW minimum code size.
        code_size: u8,
    },
}

/// Indicates the limit that prevented an operation from completing.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
#[allow(missing_copy_implementations)]
pub enum LimitErrorKind {
    /// The resulting image exceed dimension limits in either direction.
    DimensionError,
    /// The operation would have performed an allocation larger than allowed.
    InsufficientMemory,
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedKind::Signature => f.write_str("GIF signature not found"),
            MalformedKind::UnexpectedEof => f.write_str("unexpected end of data"),
            MalformedKind::InvalidBlockSize { block, found } => {
                write!(f, "invalid size {} for block {:#04X}", found, block)
            }
            MalformedKind::InvalidCodeSize(size) => write!(f, "invalid code size {}", size),
            MalformedKind::MissingColorTable => {
                f.write_str("no color table available for current frame")
            }
            MalformedKind::Lzw(err) => write!(f, "corrupt image data: {}", err),
        }
    }
}

impl fmt::Display for ParameterErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterErrorKind::DimensionMismatch => f.write_str(
                "the pixel buffer does not match the frame dimensions or they do not fit in 16 bits",
            ),
            ParameterErrorKind::FailedAlready => {
                f.write_str("the encoder already failed and can not be reused")
            }
            ParameterErrorKind::IndexOutOfRange { index, code_size } => write!(
                f,
                "palette index {} does not fit code size {}",
                index, code_size
            ),
        }
    }
}

impl fmt::Display for LimitErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitErrorKind::DimensionError => f.write_str("image is too large"),
            LimitErrorKind::InsufficientMemory => f.write_str("memory limit exceeded"),
        }
    }
}

impl GifError {
    pub(crate) fn malformed(kind: MalformedKind) -> GifError {
        MalformedSnafu { kind }.build()
    }

    pub(crate) fn unsupported(feature: impl Into<String>) -> GifError {
        UnsupportedSnafu {
            feature: feature.into(),
        }
        .build()
    }

    pub(crate) fn parameter(kind: ParameterErrorKind) -> GifError {
        ParameterSnafu { kind }.build()
    }

    pub(crate) fn limits(kind: LimitErrorKind) -> GifError {
        LimitsSnafu { kind }.build()
    }
}

/// Result of a GIF decoding/encoding process
pub type GifResult<T> = Result<T, GifError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[allow(dead_code)]
    // This will fail to compile if the size of this type is large.
    const ASSERT_SMALLISH: usize = [0][(mem::size_of::<GifError>() >= 200) as usize];

    #[test]
    fn test_send_sync_stability() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<GifError>();
    }

    #[test]
    fn display_names_the_block() {
        let err = GifError::malformed(MalformedKind::InvalidBlockSize {
            block: 0xF9,
            found: 3,
        });
        assert_eq!(
            err.to_string(),
            "Malformed GIF stream: invalid size 3 for block 0xF9"
        );
    }
}
