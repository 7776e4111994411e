//! Per-frame adaptive palette construction.
//!
//! Every frame is quantized on its own. Colors are added to the palette in the order they are
//! first seen, and a new color is only given its own slot when it is farther away from every
//! existing entry than a tolerance that grows exponentially as the palette fills up. Early on
//! nearly every distinct color gets a slot, while close to the 256 entry limit colors are merged
//! aggressively so the palette never overflows.

use std::fmt;

/// Maximum number of entries in a GIF color table.
pub const MAX_COLORS: usize = 256;

/// A 24-bit palette color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Manhattan distance between two colors, `|Δr| + |Δg| + |Δb|`.
    pub fn distance(self, other: Rgb) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(&a, &b)| u32::from(a.abs_diff(b)))
            .sum()
    }
}

/// An ordered color table.
///
/// Index 0 is reserved for transparent pixels. A palette produced by [`quantize`] has between
/// 2 and 256 entries and its length is always a power of two.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    fn with_transparent_slot() -> Palette {
        let mut colors = Vec::with_capacity(MAX_COLORS);
        colors.push(Rgb::default());
        Palette { colors }
    }

    /// Builds a palette from the raw RGB triples of a color table.
    pub fn from_rgb_bytes(table: &[u8]) -> Palette {
        Palette {
            colors: table
                .chunks_exact(3)
                .take(MAX_COLORS)
                .map(|c| Rgb([c[0], c[1], c[2]]))
                .collect(),
        }
    }

    /// The number of entries, including the reserved and padding slots.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette has no entries.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Looks up an entry.
    pub fn get(&self, index: u8) -> Option<Rgb> {
        self.colors.get(usize::from(index)).copied()
    }

    /// All entries in index order.
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    fn is_full(&self) -> bool {
        self.colors.len() >= MAX_COLORS
    }

    /// The 3-bit size field of a color table: the table holds `2 << size_field` entries.
    pub fn size_field(&self) -> u8 {
        let bits = self.colors.len().max(2).next_power_of_two().trailing_zeros();
        (bits.clamp(1, 8) - 1) as u8
    }

    /// Pads the palette with black entries up to the next power of two, at least 2.
    ///
    /// A full palette is left alone.
    fn finalize(&mut self) {
        if self.is_full() {
            return;
        }
        let len = self.colors.len().max(2).next_power_of_two();
        self.colors.resize(len, Rgb::default());
    }

    /// Writes the table as RGB triples, padded to the size announced by [`Palette::size_field`].
    pub(crate) fn to_rgb_bytes(&self) -> Vec<u8> {
        let entries = 2usize << self.size_field();
        let mut bytes = Vec::with_capacity(entries * 3);
        for color in &self.colors {
            bytes.extend_from_slice(&color.0);
        }
        bytes.resize(entries * 3, 0);
        bytes
    }
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Palette")
            .field("len", &self.colors.len())
            .finish_non_exhaustive()
    }
}

/// Distance above which a color is considered new, for a palette of `len` entries.
///
/// `15 + 40 * 2^(10 * len / 256 - 10)`: about 15 for a small palette, 55 once it is full.
fn tolerance(len: usize) -> f64 {
    15.0 + 40.0 * f64::powf(2.0, 10.0 * (len as f64 / MAX_COLORS as f64) - 10.0)
}

/// Builds the palette of one RGBA frame and maps every pixel to an index into it.
///
/// Pixels with alpha 0 map to index 0. Every other pixel reuses the first palette entry with
/// exactly the same RGB value. Failing that, it is added as a new entry unless the palette is
/// full or the nearest entry by Manhattan distance lies within the current tolerance, in which
/// case the nearest entry is reused. Among equally near entries the one with the lowest index
/// wins.
///
/// With `keep_original_colors` the nearest entry is only searched once the palette is full, so
/// every distinct color is kept exactly until the 256 entry limit is reached. Colors beyond the
/// limit are always mapped to their nearest entry, quantization never fails.
///
/// `pixels` is read in chunks of 4 bytes, a trailing partial pixel is ignored.
pub fn quantize(pixels: &[u8], keep_original_colors: bool) -> (Palette, Vec<u8>) {
    let mut palette = Palette::with_transparent_slot();
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for pixel in pixels.chunks_exact(4) {
        if pixel[3] == 0 {
            indices.push(0);
            continue;
        }

        let color = Rgb([pixel[0], pixel[1], pixel[2]]);
        let index = palette.index_for(color, keep_original_colors);
        indices.push(index);
    }

    palette.finalize();
    (palette, indices)
}

impl Palette {
    fn index_for(&mut self, color: Rgb, keep_original_colors: bool) -> u8 {
        let measure = !keep_original_colors || self.is_full();
        let mut nearest: Option<(usize, u32)> = None;

        for (i, &entry) in self.colors.iter().enumerate().skip(1) {
            if entry == color {
                return i as u8;
            }

            if measure {
                let distance = entry.distance(color);
                if nearest.map_or(true, |(_, best)| distance < best) {
                    nearest = Some((i, distance));
                }
            }
        }

        match nearest {
            Some((i, distance))
                if self.is_full() || f64::from(distance) <= tolerance(self.colors.len()) =>
            {
                i as u8
            }
            _ => {
                self.colors.push(color);
                (self.colors.len() - 1) as u8
            }
        }
    }
}
