// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for frame display and keypoint placement.
//!
//! This module provides the main canvas area where users view the current
//! frame and click to place keypoints. Clicks are reported in frame pixel
//! coordinates, whatever size and zoom the frame is displayed at.

use crate::models::session::DrawCommand;
use crate::util::{color, geometry};

/// Radius of a placed keypoint marker, in screen pixels.
const MARKER_RADIUS: f32 = 5.0;

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    PlacePoint { x: f64, y: f64 },
}

/// Display the current frame with its markers and handle clicks.
///
/// `frame` is `None` until the image of the current frame has arrived; the
/// canvas then shows a loading message instead of a stale image. The mouse
/// wheel zooms and a right-button drag pans `view`.
pub fn show(
    ui: &mut egui::Ui,
    frame: Option<(&egui::TextureHandle, (u32, u32))>,
    view: &mut geometry::ViewTransform,
    markers: &[DrawCommand],
    can_place: bool,
    has_video: bool,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        match frame {
            Some((texture, size)) => {
                let canvas_rect = ui.max_rect();
                let available = canvas_rect.size();
                let (display_width, display_height) =
                    geometry::fit_size(size, (available.x, available.y));

                // Center the frame
                let x_offset = (available.x - display_width) / 2.0;
                let y_offset = (available.y - display_height) / 2.0;
                let origin = canvas_rect.min + egui::vec2(x_offset, y_offset);

                let sense = if can_place {
                    egui::Sense::click_and_drag()
                } else {
                    egui::Sense::drag()
                };
                let response = ui.allocate_rect(canvas_rect, sense);

                if response.hovered() {
                    let scroll = ui.input(|i| i.raw_scroll_delta.y);
                    if scroll != 0.0 {
                        let anchor = response
                            .hover_pos()
                            .map(|pos| pos - origin)
                            .unwrap_or_default();
                        view.zoom_at((anchor.x, anchor.y), scroll.signum());
                    }
                }
                if response.dragged_by(egui::PointerButton::Secondary) {
                    let delta = response.drag_delta();
                    view.pan_by((delta.x, delta.y));
                }

                let (left, top) = view.apply((0.0, 0.0));
                let image_rect = egui::Rect::from_min_size(
                    origin + egui::vec2(left, top),
                    egui::vec2(display_width * view.zoom, display_height * view.zoom),
                );

                let painter = ui.painter_at(canvas_rect);
                painter.image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );

                if response.clicked() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        if image_rect.contains(pos) {
                            let offset = pos - origin;
                            let (x, y) = geometry::display_to_frame(
                                view.invert((offset.x, offset.y)),
                                (display_width, display_height),
                                size,
                            );
                            action = CanvasAction::PlacePoint { x, y };
                        }
                    }
                }

                for marker in markers {
                    let (dx, dy) = view.apply(geometry::frame_to_display(
                        (marker.x, marker.y),
                        (display_width, display_height),
                        size,
                    ));
                    painter.circle_filled(
                        origin + egui::vec2(dx, dy),
                        MARKER_RADIUS,
                        color::resolve_color(&marker.color),
                    );
                }
            }
            None if has_video => {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("Loading frame...").color(egui::Color32::WHITE));
                });
            }
            None => {
                // Show welcome message when no video is selected
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.heading(
                            egui::RichText::new("Keypoint Annotator")
                                .size(32.0)
                                .color(egui::Color32::from_gray(200)),
                        );
                        ui.add_space(20.0);
                        ui.label(
                            egui::RichText::new("Select a video to begin annotating")
                                .color(egui::Color32::from_gray(180)),
                        );
                    });
                });
            }
        }
    });

    action
}
