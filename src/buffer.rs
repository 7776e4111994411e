use std::fmt;

/// An RGBA pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// A fully transparent black pixel, the content of a blank canvas.
    pub const TRANSPARENT: Rgba = Rgba([0, 0, 0, 0]);

    /// Returns the alpha channel.
    pub fn alpha(self) -> u8 {
        self.0[3]
    }
}

/// A row-major buffer of RGBA pixels, 4 bytes per pixel.
///
/// The length of the underlying buffer is always exactly `width * height * 4`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RgbaFrame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbaFrame {
    /// Creates a new fully transparent buffer.
    ///
    /// # Panics
    ///
    /// Panics when the resulting buffer would not be addressable.
    pub fn new(width: u32, height: u32) -> RgbaFrame {
        let size = Self::buffer_len(width, height)
            .expect("Buffer length in `RgbaFrame::new` overflows usize");
        RgbaFrame {
            width,
            height,
            data: vec![0; size],
        }
    }

    /// Creates a buffer filled with a single pixel value.
    pub fn from_pixel(width: u32, height: u32, pixel: Rgba) -> RgbaFrame {
        let mut frame = RgbaFrame::new(width, height);
        for chunk in frame.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&pixel.0);
        }
        frame
    }

    /// Creates a buffer by evaluating `f` once per pixel, in row-major order.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> RgbaFrame
    where
        F: FnMut(u32, u32) -> Rgba,
    {
        let mut frame = RgbaFrame::new(width, height);
        for y in 0..height {
            for x in 0..width {
                frame.put_pixel(x, y, f(x, y));
            }
        }
        frame
    }

    /// Contructs a buffer from raw RGBA bytes.
    ///
    /// Returns `None` if the length of `data` is not exactly `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<RgbaFrame> {
        if Self::buffer_len(width, height) == Some(data.len()) {
            Some(RgbaFrame {
                width,
                height,
                data,
            })
        } else {
            None
        }
    }

    pub(crate) fn buffer_len(width: u32, height: u32) -> Option<usize> {
        usize::try_from(width)
            .ok()?
            .checked_mul(usize::try_from(height).ok()?)?
            .checked_mul(4)
    }

    /// The width and height of this buffer.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The width of this buffer.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height of this buffer.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the raw bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Returns the underlying raw buffer.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Gets the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba {
        assert!(x < self.width && y < self.height, "Pixel ({x}, {y}) is out of bounds");
        let i = self.offset(x, y);
        let mut pixel = [0; 4];
        pixel.copy_from_slice(&self.data[i..i + 4]);
        Rgba(pixel)
    }

    /// Puts a pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: Rgba) {
        assert!(x < self.width && y < self.height, "Pixel ({x}, {y}) is out of bounds");
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&pixel.0);
    }

    /// Iterates over all pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgba> + '_ {
        self.data
            .chunks_exact(4)
            .map(|p| Rgba([p[0], p[1], p[2], p[3]]))
    }
}

impl fmt::Debug for RgbaFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RgbaFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
