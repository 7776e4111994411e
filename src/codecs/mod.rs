//! Encoding and decoding of image formats.

pub mod gif;
