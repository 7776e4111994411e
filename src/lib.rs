//! GIF decoding into composited RGBA frames and re-encoding with adaptive per-frame palettes.
//!
//! Decoding resolves the disposal method of every frame, so each returned frame is the full
//! canvas exactly as it is displayed. Encoding takes full-canvas RGBA frames, builds a separate
//! palette of at most 256 colors for each of them and writes a GIF89a stream.
//!
//! ```rust
//! use rgba_gif::codecs::gif::{FrameOptions, GifEncoder};
//! use rgba_gif::{decode, Rgba, RgbaFrame};
//! # fn main() -> rgba_gif::GifResult<()> {
//! let frame = RgbaFrame::from_pixel(8, 8, Rgba([0, 128, 255, 255]));
//! let mut encoder = GifEncoder::new(Vec::new(), 8, 8, None)?;
//! encoder.add_frame(&frame, FrameOptions { keep_original_colors: true, ..Default::default() })?;
//! let bytes = encoder.finish()?;
//!
//! let document = decode(&bytes)?;
//! assert_eq!(document.frames()[0].buffer(), &frame);
//! # Ok(())
//! # }
//! ```
//!
//! Both directions are synchronous passes over in-memory data. Callers that need to stay
//! responsive can drive [`GifDecoder::next_frame`] and [`GifEncoder::add_frame`] one frame at a
//! time and check for cancellation in between.
//!
//! [`GifDecoder::next_frame`]: codecs::gif::GifDecoder::next_frame
//! [`GifEncoder::add_frame`]: codecs::gif::GifEncoder::add_frame
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub use crate::animation::{Delay, Frame, Frames};
pub use crate::buffer::{Rgba, RgbaFrame};
pub use crate::codecs::gif::{decode, DisposalMethod, FrameInfo, GifDocument, Repeat};
pub use crate::error::{GifError, GifResult};
pub use crate::limits::Limits;

mod animation;
mod buffer;
pub mod codecs;
pub mod error;
mod limits;
