//! Ensure truncated and corrupted streams are rejected without panics.

use rgba_gif::codecs::gif::{FrameOptions, GifDecoder, GifEncoder, Repeat};
use rgba_gif::error::MalformedKind;
use rgba_gif::{decode, Delay, GifError, Limits, Rgba, RgbaFrame};

fn sample() -> Vec<u8> {
    let mut encoder = GifEncoder::new(Vec::new(), 12, 7, Some(Repeat::Finite(2))).unwrap();
    for i in 0..3u32 {
        let frame = RgbaFrame::from_fn(12, 7, |x, y| {
            if (x + y + i) % 5 == 0 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([(x * 20) as u8, (y * 30) as u8, (i * 80) as u8, 255])
            }
        });
        let options = FrameOptions {
            delay: Delay::from_units(3),
            keep_original_colors: i == 1,
        };
        encoder.add_frame(&frame, options).unwrap();
    }
    encoder.finish().unwrap()
}

#[test]
fn truncated_header_is_an_error() {
    let data = sample();
    // Signature and logical screen descriptor.
    for len in 0..13 {
        assert!(
            matches!(
                GifDecoder::new(&data[..len]),
                Err(GifError::Malformed {
                    kind: MalformedKind::UnexpectedEof
                }) | Err(GifError::Malformed {
                    kind: MalformedKind::Signature
                })
            ),
            "prefix of {} bytes",
            len
        );
    }
}

#[test]
fn truncated_streams_do_not_panic() {
    let data = sample();
    let complete = decode(&data).unwrap();
    assert_eq!(complete.frame_count(), 3);

    for len in 0..data.len() {
        if let Ok(document) = decode(&data[..len]) {
            // Only cuts at a block boundary are accepted, and never produce extra frames.
            assert!(document.frame_count() <= complete.frame_count());
            for (frame, full) in document.frames().iter().zip(complete.frames()) {
                assert_eq!(frame.buffer().dimensions(), full.buffer().dimensions());
            }
        }
    }
}

#[test]
fn corrupted_bytes_do_not_panic() {
    let data = sample();
    let mut limits = Limits::default();
    limits.max_alloc = Some(1 << 20);

    for i in 0..data.len() {
        for value in [0x00, 0x01, 0x3B, 0x80, 0xFF] {
            let mut corrupted = data.clone();
            corrupted[i] = value;
            let Ok(mut decoder) = GifDecoder::new(&corrupted) else {
                continue;
            };
            if decoder.set_limits(limits.clone()).is_err() {
                continue;
            }
            while let Ok(Some(_)) = decoder.next_frame() {}
        }
    }
}
