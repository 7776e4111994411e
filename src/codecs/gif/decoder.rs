use log::{debug, trace};

use super::lzw::lzw_decode;
use super::reader::ByteReader;
use super::{Block, Compositor, DisposalMethod, Extension, FrameInfo, Palette, Repeat};
use crate::animation::{self, Delay, Frame};
use crate::buffer::RgbaFrame;
use crate::error::{GifError, GifResult, MalformedKind};
use crate::limits::Limits;

/// Application extensions that carry the animation loop count.
const LOOP_APPLICATIONS: [&[u8]; 2] = [b"NETSCAPE2.0", b"ANIMEXTS1.0"];

/// Decodes a complete GIF stream into composited RGBA frames.
///
/// This is a shorthand for [`GifDecoder::new`] followed by [`GifDecoder::into_document`] with
/// the default [`Limits`]. Either all frames are decoded or an error is returned, there is no
/// partial result.
pub fn decode(data: &[u8]) -> GifResult<GifDocument> {
    GifDecoder::new(data)?.into_document()
}

/// A fully decoded GIF stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GifDocument {
    width: u32,
    height: u32,
    repeat: Option<Repeat>,
    background_index: Option<u8>,
    frames: Vec<Frame>,
}

impl GifDocument {
    /// The width and height of the canvas.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// How often the animation repeats. `None` means it is played once.
    pub fn repeat(&self) -> Option<Repeat> {
        self.repeat
    }

    /// The background color index of the global color table, if there is one.
    pub fn background_index(&self) -> Option<u8> {
        self.background_index
    }

    /// The number of frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// The composited frames, in file order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Consumes the document, returning the composited frames.
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

struct GraphicControl {
    disposal: DisposalMethod,
    delay: Delay,
    transparent: Option<u8>,
}

/// GIF decoder
///
/// Frames are decoded one at a time in file order with [`GifDecoder::next_frame`], which lets
/// callers stop between frames. Each decoded frame is already composited onto the background
/// left behind by the disposal method of the frames before it.
pub struct GifDecoder<'a> {
    reader: ByteReader<'a>,

    width: u16,
    height: u16,
    global_palette: Option<Palette>,
    background_index: Option<u8>,
    repeat: Option<Repeat>,

    compositor: Compositor,
    limits: Limits,
    reserved_state: bool,
    done: bool,
}

impl<'a> GifDecoder<'a> {
    /// Creates a new decoder and reads the header, logical screen descriptor and global color
    /// table of `data`.
    pub fn new(data: &'a [u8]) -> GifResult<GifDecoder<'a>> {
        let mut reader = ByteReader::new(data);

        let signature = reader.read_bytes(3)?;
        if signature != b"GIF" {
            return Err(GifError::malformed(MalformedKind::Signature));
        }
        let version = reader.read_bytes(3)?;
        if version != b"87a" && version != b"89a" {
            return Err(GifError::malformed(MalformedKind::Signature));
        }

        let width = reader.read_u16()?;
        let height = reader.read_u16()?;
        let fields = reader.read_u8()?;
        let background = reader.read_u8()?;
        let _aspect_ratio = reader.read_u8()?;

        let (global_palette, background_index) = if fields & 0x80 != 0 {
            let entries = 2usize << (fields & 0x07);
            let table = reader.read_bytes(3 * entries)?;
            (Some(Palette::from_rgb_bytes(table)), Some(background))
        } else {
            (None, None)
        };

        debug!(
            "GIF{} canvas {}x{}, global color table: {}",
            String::from_utf8_lossy(version),
            width,
            height,
            global_palette.as_ref().map_or(0, Palette::len)
        );

        Ok(GifDecoder {
            reader,
            width,
            height,
            global_palette,
            background_index,
            repeat: None,
            compositor: Compositor::new(u32::from(width), u32::from(height)),
            limits: Limits::default(),
            reserved_state: false,
            done: false,
        })
    }

    /// The width and height of the canvas.
    pub fn dimensions(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    /// The repeat behaviour seen so far.
    ///
    /// Loop metadata may appear anywhere before the trailer, the value is only final once all
    /// frames have been read.
    pub fn repeat(&self) -> Option<Repeat> {
        self.repeat
    }

    /// Sets the resource limits for all following frames.
    pub fn set_limits(&mut self, limits: Limits) -> GifResult<()> {
        let (width, height) = self.dimensions();
        limits.check_dimensions(width, height)?;
        self.limits = limits;
        self.reserved_state = false;
        Ok(())
    }

    /// Decodes and composites the next frame, or returns `None` after the last one.
    ///
    /// After an error no more frames are returned.
    pub fn next_frame(&mut self) -> GifResult<Option<Frame>> {
        if self.done {
            return Ok(None);
        }
        let result = self.read_next_frame();
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }

    /// Decodes all remaining frames.
    pub fn into_document(mut self) -> GifResult<GifDocument> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame()? {
            frames.push(frame);
        }
        Ok(GifDocument {
            width: u32::from(self.width),
            height: u32::from(self.height),
            repeat: self.repeat,
            background_index: self.background_index,
            frames,
        })
    }

    /// Returns an iterator over the remaining frames.
    pub fn into_frames(self) -> animation::Frames<'a> {
        animation::Frames::new(Box::new(GifFrameIterator { decoder: self }))
    }

    fn read_next_frame(&mut self) -> GifResult<Option<Frame>> {
        let mut control = None;

        loop {
            if self.reader.is_empty() {
                debug!("GIF stream ended without a trailer");
                return Ok(None);
            }

            let label = self.reader.read_u8()?;
            match Block::from_u8(label) {
                Some(Block::Extension) => self.read_extension(&mut control)?,
                Some(Block::Image) => return self.read_image(control.take()).map(Some),
                Some(Block::Trailer) => return Ok(None),
                None => {
                    return Err(GifError::unsupported(format!(
                        "Block type {:#04X} is not supported",
                        label
                    )))
                }
            }
        }
    }

    fn read_extension(&mut self, control: &mut Option<GraphicControl>) -> GifResult<()> {
        let label = self.reader.read_u8()?;

        match Extension::from_u8(label) {
            Some(Extension::Control) => *control = Some(self.read_graphic_control()?),
            Some(Extension::Application) => self.read_application()?,
            Some(Extension::Comment) | Some(Extension::Text) => self.reader.skip_sub_blocks()?,
            None => {
                debug!("skipping unknown extension {:#04X}", label);
                self.reader.skip_sub_blocks()?;
            }
        }

        Ok(())
    }

    fn read_graphic_control(&mut self) -> GifResult<GraphicControl> {
        let size = self.reader.read_u8()?;
        if size != 4 {
            return Err(GifError::malformed(MalformedKind::InvalidBlockSize {
                block: Extension::Control as u8,
                found: size,
            }));
        }

        let fields = self.reader.read_u8()?;
        let delay = self.reader.read_u16()?;
        let transparent = self.reader.read_u8()?;
        self.reader.skip_sub_blocks()?;

        Ok(GraphicControl {
            disposal: DisposalMethod::from_u8((fields & 0x1C) >> 2),
            delay: Delay::from_units(delay),
            transparent: (fields & 0x01 != 0).then_some(transparent),
        })
    }

    fn read_application(&mut self) -> GifResult<()> {
        let identifier = self.reader.read_sub_block()?;
        if identifier.is_empty() {
            return Ok(());
        }

        let loops = LOOP_APPLICATIONS.contains(&identifier);
        if !loops {
            debug!(
                "skipping application extension {:?}",
                String::from_utf8_lossy(identifier)
            );
        }

        loop {
            let block = self.reader.read_sub_block()?;
            if block.is_empty() {
                break;
            }
            if loops && block.len() == 3 && block[0] == 1 {
                let count = u16::from_le_bytes([block[1], block[2]]);
                debug!("loop count {}", count);
                self.repeat = Some(Repeat::from_loop_count(count));
            }
        }

        Ok(())
    }

    fn read_image(&mut self, control: Option<GraphicControl>) -> GifResult<Frame> {
        let left = self.reader.read_u16()?;
        let top = self.reader.read_u16()?;
        let width = self.reader.read_u16()?;
        let height = self.reader.read_u16()?;
        let fields = self.reader.read_u8()?;

        if fields & 0x40 != 0 {
            return Err(GifError::unsupported("Interlaced images are not supported"));
        }

        let local_palette = if fields & 0x80 != 0 {
            let entries = 2usize << (fields & 0x07);
            Some(Palette::from_rgb_bytes(self.reader.read_bytes(3 * entries)?))
        } else {
            None
        };

        let min_code_size = self.reader.read_u8()?;
        let data = self.reader.read_sub_blocks()?;

        let (canvas_width, canvas_height) = self.dimensions();
        if !self.reserved_state {
            // The compositor holds on to the background and the last kept canvas.
            self.limits.reserve_rgba(canvas_width, canvas_height)?;
            self.limits.reserve_rgba(canvas_width, canvas_height)?;
            self.reserved_state = true;
        }

        // Everything allocated from here on is either dropped or handed to the caller at the
        // end of this function, so it is only checked against a local copy of the limits.
        let mut local_limits = self.limits.clone();
        let pixels = usize::from(width) * usize::from(height);
        local_limits.reserve_usize(pixels)?;
        let indices = lzw_decode(&data, min_code_size, pixels)?;

        let palette = local_palette
            .as_ref()
            .or(self.global_palette.as_ref())
            .ok_or_else(|| GifError::malformed(MalformedKind::MissingColorTable))?;

        let control = control.unwrap_or(GraphicControl {
            disposal: DisposalMethod::None,
            delay: Delay::default(),
            transparent: None,
        });
        let info = FrameInfo {
            left,
            top,
            width,
            height,
            disposal: control.disposal,
            delay: control.delay,
            transparent: control.transparent,
        };

        local_limits.reserve_rgba(canvas_width, canvas_height)?;
        let buffer: RgbaFrame = self.compositor.composite(&info, &indices, palette);
        trace!("decoded frame with {} palette entries", palette.len());

        Ok(Frame::from_parts(info, buffer))
    }
}

struct GifFrameIterator<'a> {
    decoder: GifDecoder<'a>,
}

impl<'a> Iterator for GifFrameIterator<'a> {
    type Item = GifResult<Frame>;

    fn next(&mut self) -> Option<GifResult<Frame>> {
        self.decoder.next_frame().transpose()
    }
}
