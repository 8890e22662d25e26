// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame image decoding.
//!
//! The server sends each frame as an encoded image (JPEG in practice).
//! This module turns that payload into RGBA pixels egui can upload as a
//! texture.

/// A decoded frame ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decode an encoded image payload, sniffing the format from its bytes.
pub fn decode_frame(bytes: &[u8]) -> Result<DecodedFrame, image::ImageError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedFrame {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}
