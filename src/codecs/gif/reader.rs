use std::io::Cursor;

use byteorder_lite::{LittleEndian, ReadBytesExt};

use crate::error::{GifError, GifResult, MalformedKind};

/// Little endian reader over an in-memory GIF stream.
///
/// Every read that runs past the end of the input fails with
/// [`MalformedKind::UnexpectedEof`].
pub(crate) struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

fn truncated<E>(_: E) -> GifError {
    GifError::malformed(MalformedKind::UnexpectedEof)
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> ByteReader<'a> {
        ByteReader {
            cursor: Cursor::new(data),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining().is_empty()
    }

    fn remaining(&self) -> &'a [u8] {
        let data: &'a [u8] = self.cursor.get_ref();
        let pos = usize::try_from(self.cursor.position()).unwrap_or(data.len());
        data.get(pos..).unwrap_or(&[])
    }

    pub(crate) fn read_u8(&mut self) -> GifResult<u8> {
        self.cursor.read_u8().map_err(truncated)
    }

    pub(crate) fn read_u16(&mut self) -> GifResult<u16> {
        self.cursor.read_u16::<LittleEndian>().map_err(truncated)
    }

    /// Borrows the next `n` bytes of the input.
    pub(crate) fn read_bytes(&mut self, n: usize) -> GifResult<&'a [u8]> {
        let bytes = self.remaining().get(..n).ok_or_else(|| truncated(()))?;
        self.cursor.set_position(self.cursor.position() + n as u64);
        Ok(bytes)
    }

    /// Reads one length-prefixed data sub-block. An empty slice is the block terminator.
    pub(crate) fn read_sub_block(&mut self) -> GifResult<&'a [u8]> {
        let size = self.read_u8()?;
        self.read_bytes(usize::from(size))
    }

    /// Skips data sub-blocks up to and including the terminator.
    pub(crate) fn skip_sub_blocks(&mut self) -> GifResult<()> {
        while !self.read_sub_block()?.is_empty() {}
        Ok(())
    }

    /// Concatenates data sub-blocks up to the terminator.
    pub(crate) fn read_sub_blocks(&mut self) -> GifResult<Vec<u8>> {
        let mut data = Vec::new();
        loop {
            let block = self.read_sub_block()?;
            if block.is_empty() {
                break;
            }
            data.extend_from_slice(block);
        }
        Ok(data)
    }
}
