// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Annotations are stored in pixel coordinates of the served frame, while
//! the canvas shows the frame scaled to fit the window, then zoomed and
//! panned by the user. These helpers map between the spaces.

/// Zoom limits, as a multiple of the fitted size.
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 5.0;

/// Zoom change per mouse wheel notch.
const ZOOM_STEP: f32 = 1.1;

/// Zoom and pan applied on top of the fitted frame.
///
/// Offsets are measured from the top-left corner of the fitted frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f32,
    pub pan: (f32, f32),
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: MIN_ZOOM,
            pan: (0.0, 0.0),
        }
    }
}

impl ViewTransform {
    /// Zoom by `notches` wheel steps, keeping the content under `anchor` in place.
    pub fn zoom_at(&mut self, anchor: (f32, f32), notches: f32) {
        let zoom = (self.zoom * ZOOM_STEP.powf(notches)).clamp(MIN_ZOOM, MAX_ZOOM);
        let ratio = zoom / self.zoom;
        self.pan = (
            anchor.0 - (anchor.0 - self.pan.0) * ratio,
            anchor.1 - (anchor.1 - self.pan.1) * ratio,
        );
        self.zoom = zoom;
    }

    pub fn pan_by(&mut self, delta: (f32, f32)) {
        self.pan = (self.pan.0 + delta.0, self.pan.1 + delta.1);
    }

    /// Fitted-frame offset to on-screen offset.
    pub fn apply(&self, offset: (f32, f32)) -> (f32, f32) {
        (offset.0 * self.zoom + self.pan.0, offset.1 * self.zoom + self.pan.1)
    }

    /// On-screen offset back to fitted-frame offset.
    pub fn invert(&self, offset: (f32, f32)) -> (f32, f32) {
        ((offset.0 - self.pan.0) / self.zoom, (offset.1 - self.pan.1) / self.zoom)
    }
}

/// Largest size with the frame's aspect ratio that fits in `available`.
pub fn fit_size(frame_size: (u32, u32), available: (f32, f32)) -> (f32, f32) {
    let (width, height) = frame_size;
    let frame_aspect = width as f32 / height as f32;
    let available_aspect = available.0 / available.1;

    if frame_aspect > available_aspect {
        // Frame is wider - fit to width
        (available.0, available.0 / frame_aspect)
    } else {
        // Frame is taller - fit to height
        (available.1 * frame_aspect, available.1)
    }
}

/// Convert an offset inside the displayed frame to frame pixel coordinates.
pub fn display_to_frame(offset: (f32, f32), display_size: (f32, f32), frame_size: (u32, u32)) -> (f64, f64) {
    (
        f64::from(offset.0) * f64::from(frame_size.0) / f64::from(display_size.0),
        f64::from(offset.1) * f64::from(frame_size.1) / f64::from(display_size.1),
    )
}

/// Convert frame pixel coordinates to an offset inside the displayed frame.
pub fn frame_to_display(point: (f64, f64), display_size: (f32, f32), frame_size: (u32, u32)) -> (f32, f32) {
    (
        (point.0 * f64::from(display_size.0) / f64::from(frame_size.0)) as f32,
        (point.1 * f64::from(display_size.1) / f64::from(frame_size.1)) as f32,
    )
}
