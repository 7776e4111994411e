//! The LZW variant of GIF image data.
//!
//! Codes are packed least significant bit first, start at `min_code_size + 1` bits and grow as
//! the code table fills, up to 12 bits. The two codes directly after the literals are reserved
//! for clear and end-of-information.

use weezl::{decode::Decoder as LzwDecoder, encode::Encoder as LzwEncoder, BitOrder, LzwStatus};

use crate::error::{GifError, GifResult, MalformedKind, ParameterErrorKind};

/// Smallest code size GIF encoders may declare.
pub(crate) const MIN_CODE_SIZE: u8 = 2;

/// Decompresses the concatenated data sub-blocks of one image into at most `len` palette
/// indices.
///
/// Decoding stops at the end-of-information code, once `len` indices have been produced, or when
/// the data runs out. A stream without an end code, or one that ends early, yields the indices
/// decoded so far.
pub(crate) fn lzw_decode(data: &[u8], min_code_size: u8, len: usize) -> GifResult<Vec<u8>> {
    if min_code_size == 0 || min_code_size > 8 {
        return Err(GifError::malformed(MalformedKind::InvalidCodeSize(
            min_code_size,
        )));
    }

    let mut decoder = LzwDecoder::new(BitOrder::Lsb, min_code_size);
    let mut indices = vec![0; len];
    let mut filled = 0;
    let mut input = data;

    while filled < len {
        let result = decoder.decode_bytes(input, &mut indices[filled..]);
        input = &input[result.consumed_in..];
        filled += result.consumed_out;

        match result.status {
            Ok(LzwStatus::Ok) if result.consumed_in > 0 || result.consumed_out > 0 => {}
            Ok(LzwStatus::Ok) | Ok(LzwStatus::NoProgress) | Ok(LzwStatus::Done) => break,
            Err(err) => {
                return Err(GifError::malformed(MalformedKind::Lzw(err.to_string())));
            }
        }
    }

    indices.truncate(filled);
    Ok(indices)
}

/// Compresses palette indices, each of which must be below `1 << min_code_size`.
pub(crate) fn lzw_encode(indices: &[u8], min_code_size: u8) -> GifResult<Vec<u8>> {
    debug_assert!((MIN_CODE_SIZE..=8).contains(&min_code_size));
    LzwEncoder::new(BitOrder::Lsb, min_code_size)
        .encode(indices)
        .map_err(|_| {
            GifError::parameter(ParameterErrorKind::IndexOutOfRange {
                index: indices.iter().copied().max().unwrap_or(0),
                code_size: min_code_size,
            })
        })
}
