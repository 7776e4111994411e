#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate rgba_gif;

fuzz_target!(|data: &[u8]| {
    let _ = decode(data);
});

fn decode(data: &[u8]) -> Result<(), rgba_gif::GifError> {
    let mut limits = rgba_gif::Limits::default();
    limits.max_alloc = Some(16 << 20);

    let mut decoder = rgba_gif::codecs::gif::GifDecoder::new(data)?;
    decoder.set_limits(limits)?;
    while let Some(_frame) = decoder.next_frame()? {}
    Ok(())
}
