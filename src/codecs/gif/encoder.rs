use std::io::{self, Write};

use byteorder_lite::{LittleEndian, WriteBytesExt};
use log::{debug, trace};
use snafu::ResultExt;

use super::lzw::{lzw_encode, MIN_CODE_SIZE};
use super::{quantize, Block, DisposalMethod, Extension, Palette, Repeat};
use crate::animation::Delay;
use crate::buffer::RgbaFrame;
use crate::error::{GifError, GifResult, IoSnafu, ParameterErrorKind};

/// Largest size of a data sub-block.
const MAX_SUB_BLOCK: usize = 0xFF;

/// Options for a single encoded frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameOptions {
    /// How long the frame is shown. Stored in units of 10ms, rounded down.
    pub delay: Delay,
    /// Give every distinct color its own palette entry until the palette is full, instead of
    /// merging similar colors.
    pub keep_original_colors: bool,
}

/// GIF encoder.
///
/// Writes a GIF89a stream with one self-contained frame per [`GifEncoder::add_frame`] call.
/// Every frame carries its own local color table built from that frame alone, has index 0 as
/// its transparent color and is disposed to the background, so pixels with alpha 0 stay
/// transparent instead of revealing the previous frame.
pub struct GifEncoder<W: Write> {
    w: Option<W>,
    width: u16,
    height: u16,
    frames: usize,
}

impl<W: Write> GifEncoder<W> {
    /// Creates a new GIF encoder for a canvas of `width` by `height` pixels and writes the
    /// stream header.
    ///
    /// With a `repeat` the looping application extension is written, `None` means the
    /// animation is played once.
    pub fn new(
        mut w: W,
        width: u32,
        height: u32,
        repeat: Option<Repeat>,
    ) -> GifResult<GifEncoder<W>> {
        let (width, height) = gif_dimensions(width, height)?;

        write_header(&mut w, width, height, repeat).context(IoSnafu)?;
        debug!("opened {}x{} GIF stream, repeat {:?}", width, height, repeat);

        Ok(GifEncoder {
            w: Some(w),
            width,
            height,
            frames: 0,
        })
    }

    /// Quantizes and writes one frame. The frame must have the dimensions of the canvas.
    pub fn add_frame(&mut self, frame: &RgbaFrame, options: FrameOptions) -> GifResult<()> {
        if gif_dimensions(frame.width(), frame.height())? != (self.width, self.height) {
            return Err(GifError::parameter(ParameterErrorKind::DimensionMismatch));
        }
        self.add_frame_rgba(frame.as_raw(), options)
    }

    /// Quantizes and writes one frame of raw RGBA bytes covering the whole canvas.
    pub fn add_frame_rgba(&mut self, pixels: &[u8], options: FrameOptions) -> GifResult<()> {
        let expected = usize::from(self.width) * usize::from(self.height) * 4;
        if pixels.len() != expected {
            return Err(GifError::parameter(ParameterErrorKind::DimensionMismatch));
        }

        let w = self
            .w
            .as_mut()
            .ok_or_else(|| GifError::parameter(ParameterErrorKind::FailedAlready))?;

        let (palette, indices) = quantize(pixels, options.keep_original_colors);
        let min_code_size = MIN_CODE_SIZE.max(palette.size_field() + 1);
        let data = lzw_encode(&indices, min_code_size)?;

        let result = write_frame(
            w,
            self.width,
            self.height,
            options.delay,
            &palette,
            min_code_size,
            &data,
        );
        if let Err(err) = result {
            self.w = None;
            return Err(err).context(IoSnafu);
        }

        trace!(
            "encoded frame {} with {} palette entries into {} bytes",
            self.frames,
            palette.len(),
            data.len()
        );
        self.frames += 1;
        Ok(())
    }

    /// Encodes a sequence of frames.
    pub fn encode_frames<F>(&mut self, frames: F) -> GifResult<()>
    where
        F: IntoIterator<Item = (RgbaFrame, FrameOptions)>,
    {
        for (frame, options) in frames {
            self.add_frame(&frame, options)?;
        }
        Ok(())
    }

    /// Writes the trailer and returns the writer.
    pub fn finish(mut self) -> GifResult<W> {
        let mut w = self
            .w
            .take()
            .ok_or_else(|| GifError::parameter(ParameterErrorKind::FailedAlready))?;
        w.write_u8(Block::Trailer as u8).context(IoSnafu)?;
        w.flush().context(IoSnafu)?;
        debug!("finished GIF stream with {} frames", self.frames);
        Ok(w)
    }
}

fn gif_dimensions(width: u32, height: u32) -> GifResult<(u16, u16)> {
    fn inner_dimensions(width: u32, height: u32) -> Option<(u16, u16)> {
        let width = u16::try_from(width).ok()?;
        let height = u16::try_from(height).ok()?;
        Some((width, height))
    }

    inner_dimensions(width, height)
        .ok_or_else(|| GifError::parameter(ParameterErrorKind::DimensionMismatch))
}

fn write_header<W: Write>(
    w: &mut W,
    width: u16,
    height: u16,
    repeat: Option<Repeat>,
) -> io::Result<()> {
    w.write_all(b"GIF89a")?;
    w.write_u16::<LittleEndian>(width)?;
    w.write_u16::<LittleEndian>(height)?;
    // No global color table, every frame brings its own.
    w.write_all(&[0x00, 0x00, 0x00])?;

    if let Some(repeat) = repeat {
        w.write_all(&[Block::Extension as u8, Extension::Application as u8, 0x0B])?;
        w.write_all(b"NETSCAPE2.0")?;
        w.write_all(&[0x03, 0x01])?;
        w.write_u16::<LittleEndian>(repeat.loop_count())?;
        w.write_u8(0x00)?;
    }

    Ok(())
}

fn write_frame<W: Write>(
    w: &mut W,
    width: u16,
    height: u16,
    delay: Delay,
    palette: &Palette,
    min_code_size: u8,
    data: &[u8],
) -> io::Result<()> {
    // Graphic control: disposal and the transparent flag for index 0.
    let disposal = DisposalMethod::RestoreBackground as u8;
    w.write_all(&[Block::Extension as u8, Extension::Control as u8, 0x04])?;
    w.write_u8((disposal << 2) | 0x01)?;
    w.write_u16::<LittleEndian>(delay.to_units())?;
    w.write_all(&[0x00, 0x00])?;

    // Image descriptor with a local color table.
    w.write_u8(Block::Image as u8)?;
    w.write_u16::<LittleEndian>(0)?;
    w.write_u16::<LittleEndian>(0)?;
    w.write_u16::<LittleEndian>(width)?;
    w.write_u16::<LittleEndian>(height)?;
    w.write_u8(0x80 | palette.size_field())?;
    w.write_all(&palette.to_rgb_bytes())?;

    w.write_u8(min_code_size)?;
    for block in data.chunks(MAX_SUB_BLOCK) {
        w.write_u8(block.len() as u8)?;
        w.write_all(block)?;
    }
    w.write_u8(0x00)
}

#[cfg(test)]
mod tests {
    use super::{FrameOptions, GifEncoder};
    use crate::buffer::{Rgba, RgbaFrame};
    use crate::codecs::gif::Repeat;
    use crate::error::{GifError, ParameterErrorKind};

    #[test]
    fn empty_stream_is_header_and_trailer() {
        let bytes = GifEncoder::new(Vec::new(), 3, 2, None).unwrap().finish().unwrap();
        assert_eq!(bytes, b"GIF89a\x03\x00\x02\x00\x00\x00\x00\x3B");
    }

    #[test]
    fn repeat_writes_netscape_extension() {
        let bytes = GifEncoder::new(Vec::new(), 1, 1, Some(Repeat::Finite(5)))
            .unwrap()
            .finish()
            .unwrap();
        assert_eq!(&bytes[13..16], &[0x21, 0xFF, 0x0B]);
        assert_eq!(&bytes[16..27], b"NETSCAPE2.0");
        assert_eq!(&bytes[27..32], &[0x03, 0x01, 0x05, 0x00, 0x00]);
    }

    #[test]
    fn frame_block_layout() {
        let mut encoder = GifEncoder::new(Vec::new(), 2, 1, None).unwrap();
        let frame = RgbaFrame::from_pixel(2, 1, Rgba([9, 8, 7, 255]));
        let options = FrameOptions {
            delay: crate::Delay::from_units(3),
            keep_original_colors: true,
        };
        encoder.add_frame(&frame, options).unwrap();
        let bytes = encoder.finish().unwrap();

        // Graphic control: restore background, transparent index 0, delay 3.
        assert_eq!(&bytes[13..21], &[0x21, 0xF9, 0x04, 0x09, 0x03, 0x00, 0x00, 0x00]);
        // Image descriptor: full canvas, local table of 2 entries.
        assert_eq!(&bytes[21..31], &[0x2C, 0, 0, 0, 0, 2, 0, 1, 0, 0x80]);
        assert_eq!(&bytes[31..37], &[0, 0, 0, 9, 8, 7]);
        // Minimum code size for a 1 bit palette.
        assert_eq!(bytes[37], 2);
        assert_eq!(bytes.last(), Some(&0x3B));
    }

    #[test]
    fn mismatched_frames_are_rejected() {
        let mut encoder = GifEncoder::new(Vec::new(), 2, 2, None).unwrap();
        assert!(matches!(
            encoder.add_frame(&RgbaFrame::new(2, 3), FrameOptions::default()),
            Err(GifError::Parameter {
                kind: ParameterErrorKind::DimensionMismatch
            })
        ));
        assert!(matches!(
            encoder.add_frame_rgba(&[0; 15], FrameOptions::default()),
            Err(GifError::Parameter {
                kind: ParameterErrorKind::DimensionMismatch
            })
        ));
    }

    #[test]
    fn oversized_canvas_is_rejected() {
        assert!(GifEncoder::new(Vec::new(), 70_000, 1, None).is_err());
    }

    struct FailingWriter;

    impl std::io::Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if buf.len() > 64 {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "full"))
            } else {
                Ok(buf.len())
            }
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn encoder_can_not_be_reused_after_write_error() {
        let mut encoder = GifEncoder::new(FailingWriter, 8, 8, None).unwrap();
        let frame = RgbaFrame::from_fn(8, 8, |x, y| {
            Rgba([(x * 30) as u8, (y * 30) as u8, 0, 255])
        });
        let options = FrameOptions {
            keep_original_colors: true,
            ..FrameOptions::default()
        };
        assert!(matches!(
            encoder.add_frame(&frame, options),
            Err(GifError::Io { .. })
        ));
        assert!(matches!(
            encoder.add_frame(&frame, options),
            Err(GifError::Parameter {
                kind: ParameterErrorKind::FailedAlready
            })
        ));
    }
}
