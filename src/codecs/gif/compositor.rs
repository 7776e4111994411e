use std::mem;
use std::sync::Arc;

use log::trace;

use super::{DisposalMethod, FrameInfo, Palette};
use crate::buffer::{Rgba, RgbaFrame};

/// What the next frame is drawn on top of.
///
/// The state is consumed exactly once per frame: compositing takes it out of the
/// [`Compositor`] and the disposal method of the composited frame puts the next one in.
#[derive(Clone, Debug, Default)]
pub enum Background {
    /// Nothing has been drawn yet.
    #[default]
    None,
    /// The previous frame was disposed to the background, the next frame starts blank.
    Cleared,
    /// The next frame starts from a copy of this canvas.
    Inherit(Arc<RgbaFrame>),
}

/// Turns the decoded indices of each frame into a fully composited canvas.
///
/// Frames must be fed in file order. The compositor remembers two canvases at most: the
/// background for the next frame and the last canvas whose disposal method kept it in place,
/// which `RestorePrevious` frames return to.
#[derive(Debug)]
pub struct Compositor {
    width: u32,
    height: u32,
    background: Background,
    stable: Option<Arc<RgbaFrame>>,
}

impl Compositor {
    /// Creates a compositor for a canvas of `width` by `height` pixels.
    pub fn new(width: u32, height: u32) -> Compositor {
        Compositor {
            width,
            height,
            background: Background::None,
            stable: None,
        }
    }

    /// The background the next frame will be drawn on.
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Composites one frame.
    ///
    /// `indices` are the decompressed pixels of the frame rectangle described by `info`, in
    /// row-major order, resolved against `palette`. Pixels carrying the transparent index of
    /// `info`, or an index outside of `palette`, leave the background visible. The parts of the
    /// rectangle outside of the canvas are clipped.
    pub fn composite(&mut self, info: &FrameInfo, indices: &[u8], palette: &Palette) -> RgbaFrame {
        let mut canvas = match mem::take(&mut self.background) {
            Background::Inherit(frame) => RgbaFrame::clone(&frame),
            Background::Cleared | Background::None => RgbaFrame::new(self.width, self.height),
        };

        self.blit(&mut canvas, info, indices, palette);

        self.background = if info.disposal.keeps_frame() {
            let kept = Arc::new(canvas.clone());
            self.stable = Some(Arc::clone(&kept));
            Background::Inherit(kept)
        } else if info.disposal == DisposalMethod::RestoreBackground {
            Background::Cleared
        } else {
            match &self.stable {
                Some(frame) => Background::Inherit(Arc::clone(frame)),
                None => Background::None,
            }
        };

        trace!(
            "composited {}x{} frame at {:?}, disposal {:?}",
            info.width,
            info.height,
            info.offset(),
            info.disposal
        );

        canvas
    }

    fn blit(&self, canvas: &mut RgbaFrame, info: &FrameInfo, indices: &[u8], palette: &Palette) {
        let (left, top) = info.offset();
        let (width, height) = info.extent();
        if width == 0 || height == 0 {
            return;
        }

        for (row, line) in indices.chunks(width as usize).take(height as usize).enumerate() {
            let y = top + row as u32;
            if y >= self.height {
                break;
            }
            for (col, &index) in line.iter().enumerate() {
                let x = left + col as u32;
                if x >= self.width {
                    break;
                }
                if info.transparent == Some(index) {
                    continue;
                }
                if let Some(color) = palette.get(index) {
                    let [r, g, b] = color.0;
                    canvas.put_pixel(x, y, Rgba([r, g, b, 0xFF]));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Background, Compositor};
    use crate::animation::Delay;
    use crate::buffer::Rgba;
    use crate::codecs::gif::{DisposalMethod, FrameInfo, Palette};

    const RED: Rgba = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba = Rgba([0, 255, 0, 255]);
    const BLUE: Rgba = Rgba([0, 0, 255, 255]);

    fn palette() -> Palette {
        Palette::from_rgb_bytes(&[0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255])
    }

    fn info(rect: (u16, u16, u16, u16), disposal: DisposalMethod) -> FrameInfo {
        FrameInfo {
            left: rect.0,
            top: rect.1,
            width: rect.2,
            height: rect.3,
            disposal,
            delay: Delay::default(),
            transparent: Some(0),
        }
    }

    fn full(disposal: DisposalMethod) -> FrameInfo {
        info((0, 0, 2, 2), disposal)
    }

    #[test]
    fn first_frame_starts_blank() {
        let mut compositor = Compositor::new(2, 2);
        let frame = compositor.composite(&full(DisposalMethod::None), &[1, 0, 0, 0], &palette());
        assert_eq!(frame.get_pixel(0, 0), RED);
        assert_eq!(frame.get_pixel(1, 0), Rgba::TRANSPARENT);
    }

    #[test]
    fn transparent_pixels_keep_background() {
        let mut compositor = Compositor::new(2, 2);
        compositor.composite(&full(DisposalMethod::DoNotDispose), &[1, 1, 1, 1], &palette());
        let frame = compositor.composite(&full(DisposalMethod::None), &[0, 2, 0, 0], &palette());
        assert_eq!(frame.get_pixel(0, 0), RED);
        assert_eq!(frame.get_pixel(1, 0), GREEN);
        assert_eq!(frame.get_pixel(1, 1), RED);
    }

    #[test]
    fn restore_background_clears_for_next_frame_only() {
        let mut compositor = Compositor::new(2, 2);
        compositor.composite(&full(DisposalMethod::RestoreBackground), &[1, 1, 1, 1], &palette());
        assert!(matches!(compositor.background(), Background::Cleared));

        let second = compositor.composite(&full(DisposalMethod::None), &[2, 0, 0, 0], &palette());
        assert_eq!(second.get_pixel(0, 0), GREEN);
        assert_eq!(second.get_pixel(1, 1), Rgba::TRANSPARENT);

        let third = compositor.composite(&full(DisposalMethod::None), &[0, 0, 0, 3], &palette());
        assert_eq!(third.get_pixel(0, 0), GREEN);
        assert_eq!(third.get_pixel(1, 1), BLUE);
    }

    #[test]
    fn restore_previous_chain_returns_to_stable_frame() {
        let mut compositor = Compositor::new(2, 2);
        let base = compositor.composite(&full(DisposalMethod::DoNotDispose), &[1, 1, 1, 1], &palette());

        let positions = [[2, 0, 0, 0], [0, 2, 0, 0], [0, 0, 2, 0]];
        for (i, indices) in positions.iter().enumerate() {
            let frame = compositor.composite(&full(DisposalMethod::RestorePrevious), indices, &palette());
            let mut expected = base.clone();
            expected.put_pixel(i as u32 % 2, i as u32 / 2, GREEN);
            assert_eq!(frame, expected, "frame {} composited onto the wrong background", i + 1);
        }
    }

    #[test]
    fn restore_previous_without_stable_frame_is_blank() {
        let mut compositor = Compositor::new(2, 2);
        compositor.composite(&full(DisposalMethod::RestorePrevious), &[1, 1, 1, 1], &palette());
        let frame = compositor.composite(&full(DisposalMethod::None), &[0, 0, 0, 0], &palette());
        assert!(frame.pixels().all(|p| p == Rgba::TRANSPARENT));
    }

    #[test]
    fn later_frames_do_not_alias_inherited_canvas() {
        let mut compositor = Compositor::new(2, 2);
        let first = compositor.composite(&full(DisposalMethod::None), &[1, 1, 1, 1], &palette());
        let second = compositor.composite(&full(DisposalMethod::None), &[3, 3, 3, 3], &palette());
        assert!(first.pixels().all(|p| p == RED));
        assert!(second.pixels().all(|p| p == BLUE));
    }

    #[test]
    fn sub_rectangle_is_offset_and_clipped() {
        let mut compositor = Compositor::new(3, 3);
        compositor.composite(&info((0, 0, 3, 3), DisposalMethod::DoNotDispose), &[1; 9], &palette());
        let frame = compositor.composite(
            &info((2, 2, 2, 2), DisposalMethod::None),
            &[3, 3, 3, 3],
            &palette(),
        );
        assert_eq!(frame.get_pixel(2, 2), BLUE);
        assert_eq!(frame.get_pixel(1, 1), RED);
        assert_eq!(frame.get_pixel(2, 1), RED);
    }

    #[test]
    fn short_index_data_and_bad_indices_leave_background() {
        let mut compositor = Compositor::new(2, 2);
        compositor.composite(&full(DisposalMethod::DoNotDispose), &[1; 4], &palette());
        let frame = compositor.composite(&full(DisposalMethod::None), &[200, 3], &palette());
        assert_eq!(frame.get_pixel(0, 0), RED);
        assert_eq!(frame.get_pixel(1, 0), BLUE);
        assert_eq!(frame.get_pixel(0, 1), RED);
    }
}
