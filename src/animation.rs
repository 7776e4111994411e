use std::iter::Iterator;
use std::time::Duration;

use num_rational::Ratio;

use crate::buffer::RgbaFrame;
use crate::codecs::gif::FrameInfo;
use crate::error::GifResult;

/// An implementation dependent iterator, reading the frames as requested
pub struct Frames<'a> {
    iterator: Box<dyn Iterator<Item = GifResult<Frame>> + 'a>,
}

impl<'a> Frames<'a> {
    /// Creates a new `Frames` from an implementation specific iterator.
    pub fn new(iterator: Box<dyn Iterator<Item = GifResult<Frame>> + 'a>) -> Self {
        Frames { iterator }
    }

    /// Steps through the iterator from the current frame until the end and pushes each frame into
    /// a `Vec`.
    /// If en error is encountered that error is returned instead.
    ///
    /// Note: This is equivalent to `Frames::collect::<GifResult<Vec<Frame>>>()`
    pub fn collect_frames(self) -> GifResult<Vec<Frame>> {
        self.collect()
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = GifResult<Frame>;
    fn next(&mut self) -> Option<GifResult<Frame>> {
        self.iterator.next()
    }
}

/// A single composited animation frame.
///
/// The buffer always covers the whole canvas. It is owned by the frame and never shared with
/// other frames, later frames copy it when they inherit it as their background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    info: FrameInfo,
    buffer: RgbaFrame,
}

impl Frame {
    /// Contructs a new frame
    pub fn from_parts(info: FrameInfo, buffer: RgbaFrame) -> Frame {
        Frame { info, buffer }
    }

    /// The metadata parsed for this frame.
    pub fn info(&self) -> &FrameInfo {
        &self.info
    }

    /// Delay of this frame
    pub fn delay(&self) -> Delay {
        self.info.delay
    }

    /// Returns the image buffer
    pub fn buffer(&self) -> &RgbaFrame {
        &self.buffer
    }

    /// Returns the image buffer
    pub fn into_buffer(self) -> RgbaFrame {
        self.buffer
    }
}

/// The delay of a frame relative to the previous one.
///
/// GIF stores delays in units of 10ms. The delay is kept as a ratio of milliseconds so that
/// scaled delays do not lose precision before they are written back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Hash)]
pub struct Delay {
    ratio: Ratio<u32>,
}

impl Default for Delay {
    fn default() -> Self {
        Delay::from_ratio(Ratio::from_integer(0))
    }
}

impl Delay {
    /// Create a delay from a ratio of milliseconds.
    ///
    /// # Examples
    ///
    /// ```
    /// use rgba_gif::Delay;
    /// let delay_10ms = Delay::from_num_denom_ms(10, 1);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `denominator` is zero.
    pub fn from_num_denom_ms(numerator: u32, denominator: u32) -> Self {
        assert!(denominator != 0, "delay denominator must not be zero");
        Delay {
            ratio: Ratio::new_raw(numerator, denominator),
        }
    }

    /// Create a delay from GIF time units of 10ms each.
    ///
    /// ```
    /// use rgba_gif::Delay;
    /// assert_eq!(Delay::from_units(7).num_denom_ms(), (70, 1));
    /// ```
    pub fn from_units(units: u16) -> Self {
        Delay::from_ratio(Ratio::from_integer(u32::from(units) * 10))
    }

    /// The delay in GIF time units, rounded down and saturated at `u16::MAX`.
    pub fn to_units(self) -> u16 {
        (self.ratio.to_integer() / 10).try_into().unwrap_or(u16::MAX)
    }

    /// The numerator and denominator of the delay in milliseconds.
    pub fn num_denom_ms(self) -> (u32, u32) {
        (*self.ratio.numer(), *self.ratio.denom())
    }

    /// Scales the delay for playback `speed` times faster.
    ///
    /// A speed of zero, or any speed that is not a positive number, produces a zero delay.
    ///
    /// ```
    /// use rgba_gif::Delay;
    /// assert_eq!(Delay::from_units(10).with_speed(2.0).to_units(), 5);
    /// assert_eq!(Delay::from_units(10).with_speed(0.0).to_units(), 0);
    /// ```
    pub fn with_speed(self, speed: f32) -> Self {
        if !(speed > 0.0) {
            return Delay::default();
        }
        let ms = f64::from(*self.ratio.numer()) / f64::from(*self.ratio.denom());
        let scaled = (ms / f64::from(speed)).floor();
        let scaled = if scaled >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            scaled as u32
        };
        Delay::from_ratio(Ratio::from_integer(scaled))
    }

    pub(crate) fn from_ratio(ratio: Ratio<u32>) -> Self {
        Delay { ratio }
    }

    pub(crate) fn into_ratio(self) -> Ratio<u32> {
        self.ratio
    }
}

impl From<Delay> for Duration {
    fn from(delay: Delay) -> Self {
        let ratio = delay.into_ratio();
        let ms = ratio.to_integer();
        let rest = ratio.numer() % ratio.denom();
        let nanos = (u64::from(rest) * 1_000_000) / u64::from(*ratio.denom());
        Duration::from_millis(ms.into()) + Duration::from_nanos(nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::{Delay, Duration};

    #[test]
    fn simple() {
        let second = Delay::from_num_denom_ms(1000, 1);
        assert_eq!(Duration::from(second), Duration::from_secs(1));
    }

    #[test]
    fn fps_30() {
        let thirtieth = Delay::from_num_denom_ms(1000, 30);
        let duration = Duration::from(thirtieth);
        assert_eq!(duration.as_secs(), 0);
        assert_eq!(duration.subsec_millis(), 33);
        assert_eq!(duration.subsec_nanos(), 33_333_333);
    }

    #[test]
    #[should_panic(expected = "denominator must not be zero")]
    fn zero_denominator_is_rejected() {
        let _ = Delay::from_num_denom_ms(10, 0);
    }

    #[test]
    fn units_round_trip() {
        for units in [0u16, 1, 9, 100, u16::MAX] {
            assert_eq!(Delay::from_units(units).to_units(), units);
        }
        assert_eq!(Duration::from(Delay::from_units(4)), Duration::from_millis(40));
    }

    #[test]
    fn units_truncate_and_saturate() {
        assert_eq!(Delay::from_num_denom_ms(19, 1).to_units(), 1);
        assert_eq!(Delay::from_num_denom_ms(u32::MAX, 1).to_units(), u16::MAX);
    }

    #[test]
    fn speed_scaling_truncates() {
        assert_eq!(Delay::from_units(10).with_speed(3.0).to_units(), 3);
        assert_eq!(Delay::from_units(10).with_speed(0.5).to_units(), 20);
        assert_eq!(Delay::from_units(10).with_speed(-1.0), Delay::default());
        assert_eq!(Delay::from_units(10).with_speed(f32::NAN), Delay::default());
    }
}
