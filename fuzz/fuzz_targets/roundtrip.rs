#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate rgba_gif;

use rgba_gif::codecs::gif::{FrameOptions, GifEncoder};

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }
    let width = u32::from(data[0] % 32) + 1;
    let keep_original_colors = data[1] & 1 == 1;
    let pixels = &data[2..];
    let frame_len = width as usize * 4;
    let height = (pixels.len() / frame_len) as u32;
    if height == 0 {
        return;
    }
    let pixels = &pixels[..frame_len * height as usize];

    let options = FrameOptions {
        keep_original_colors,
        ..FrameOptions::default()
    };
    let mut encoder = GifEncoder::new(Vec::new(), width, height, None).unwrap();
    encoder.add_frame_rgba(pixels, options).unwrap();
    let encoded = encoder.finish().unwrap();

    let document = rgba_gif::decode(&encoded).expect("encoder output must decode");
    let decoded = document.frames()[0].buffer();
    assert_eq!(decoded.dimensions(), (width, height));
    for (original, decoded) in pixels.chunks_exact(4).zip(decoded.pixels()) {
        // Transparency survives, colors may be merged.
        assert_eq!(original[3] == 0, decoded.alpha() == 0);
    }
});
