//!  Decoding and encoding of GIF Images
//!
//!  GIF (Graphics Interchange Format) is an image format that supports lossless compression.
//!
//!  Decoding produces one fully composited RGBA canvas per frame, with the disposal method of
//!  every frame applied to the background the following frame inherits. Encoding quantizes each
//!  RGBA frame independently into its own local color table, with index 0 reserved for
//!  transparent pixels.
//!
//!  # Related Links
//!  * <http://www.w3.org/Graphics/GIF/spec-gif89a.txt> - The GIF Specification
//!
//! # Examples
//! ```rust
//! use rgba_gif::codecs::gif::{decode, FrameOptions, GifEncoder, Repeat};
//! use rgba_gif::{Rgba, RgbaFrame};
//! # fn main() -> rgba_gif::GifResult<()> {
//! let red = RgbaFrame::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
//! let blue = RgbaFrame::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
//!
//! // Encode two frames into an infinitely looping gif
//! let mut encoder = GifEncoder::new(Vec::new(), 4, 4, Some(Repeat::Infinite))?;
//! encoder.add_frame(&red, FrameOptions::default())?;
//! encoder.add_frame(&blue, FrameOptions::default())?;
//! let bytes = encoder.finish()?;
//!
//! // Decode the frames again
//! let document = decode(&bytes)?;
//! assert_eq!(document.frame_count(), 2);
//! assert_eq!(document.repeat(), Some(Repeat::Infinite));
//! # Ok(())
//! # }
//! ```

use crate::animation::Delay;

pub use self::compositor::{Background, Compositor};
pub use self::decoder::{decode, GifDecoder, GifDocument};
pub use self::encoder::{FrameOptions, GifEncoder};
pub use self::palette::{quantize, Palette, Rgb};

mod compositor;
mod decoder;
mod encoder;
mod lzw;
mod palette;
mod reader;

/// Known block types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Block {
    Image = 0x2C,
    Extension = 0x21,
    Trailer = 0x3B,
}

impl Block {
    pub(crate) fn from_u8(n: u8) -> Option<Block> {
        match n {
            0x2C => Some(Block::Image),
            0x21 => Some(Block::Extension),
            0x3B => Some(Block::Trailer),
            _ => None,
        }
    }
}

/// Known GIF extensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Extension {
    Text = 0x01,
    Control = 0xF9,
    Comment = 0xFE,
    Application = 0xFF,
}

impl Extension {
    pub(crate) fn from_u8(n: u8) -> Option<Extension> {
        match n {
            0x01 => Some(Extension::Text),
            0xF9 => Some(Extension::Control),
            0xFE => Some(Extension::Comment),
            0xFF => Some(Extension::Application),
            _ => None,
        }
    }
}

/// Method to dispose a frame before the next one is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DisposalMethod {
    /// No disposal specified. The next frame is drawn on top of this one.
    #[default]
    None = 0,
    /// Leave the frame in place. The next frame is drawn on top of this one.
    DoNotDispose = 1,
    /// Clear the canvas. The next frame is drawn on a blank canvas.
    RestoreBackground = 2,
    /// Restore the last frame that was not disposed with this method.
    RestorePrevious = 3,
}

impl DisposalMethod {
    /// Converts the 3-bit field of a graphic control extension.
    ///
    /// The values 4 to 7 are reserved and treated as [`DisposalMethod::None`].
    pub fn from_u8(n: u8) -> DisposalMethod {
        match n {
            1 => DisposalMethod::DoNotDispose,
            2 => DisposalMethod::RestoreBackground,
            3 => DisposalMethod::RestorePrevious,
            _ => DisposalMethod::None,
        }
    }

    /// Whether the composited result remains as background for later frames.
    pub fn keeps_frame(self) -> bool {
        matches!(self, DisposalMethod::None | DisposalMethod::DoNotDispose)
    }
}

/// Number of repetitions for a GIF animation
///
/// A stream without loop metadata is played once, which is represented as `Option::None`
/// wherever a repeat is passed or returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Repeat {
    /// Finite number of repetitions
    Finite(u16),
    /// Looping GIF
    Infinite,
}

impl Repeat {
    pub(crate) fn from_loop_count(count: u16) -> Repeat {
        match count {
            0 => Repeat::Infinite,
            n => Repeat::Finite(n),
        }
    }

    pub(crate) fn loop_count(self) -> u16 {
        match self {
            Repeat::Finite(n) => n,
            Repeat::Infinite => 0,
        }
    }
}

/// Per-frame metadata parsed from the graphic control extension and the image descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameInfo {
    pub(crate) left: u16,
    pub(crate) top: u16,
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) disposal: DisposalMethod,
    pub(crate) delay: Delay,
    pub(crate) transparent: Option<u8>,
}

impl FrameInfo {
    /// The disposal method of this frame.
    pub fn disposal(&self) -> DisposalMethod {
        self.disposal
    }

    /// The delay before the next frame is shown.
    pub fn delay(&self) -> Delay {
        self.delay
    }

    /// The palette index that is not drawn, if the transparency flag is set.
    pub fn transparent_index(&self) -> Option<u8> {
        self.transparent
    }

    /// Offset of the frame rectangle from the top left corner of the canvas.
    pub fn offset(&self) -> (u32, u32) {
        (u32::from(self.left), u32::from(self.top))
    }

    /// Width and height of the frame rectangle.
    pub fn extent(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }
}
