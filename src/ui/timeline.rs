// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video timeline scrubber control.
//!
//! This module provides the timeline scrubber for navigating through
//! video frames and selecting the frame to annotate.

use crate::models::session::SessionState;

/// Result of timeline interaction.
pub enum TimelineAction {
    None,
    SetFrame(i64),
    Step(i64),
}

/// Display previous/next buttons, the frame slider and a frame number field.
pub fn show(ui: &mut egui::Ui, session: &SessionState) -> TimelineAction {
    let mut action = TimelineAction::None;
    let last = i64::from(session.total_frames()) - 1;

    ui.horizontal(|ui| {
        if !session.is_ready() {
            ui.disable();
        }

        if ui.button("◀ Prev").clicked() {
            action = TimelineAction::Step(-1);
        }
        if ui.button("Next ▶").clicked() {
            action = TimelineAction::Step(1);
        }

        // Leave room for the frame field and the counter
        ui.spacing_mut().slider_width = (ui.available_width() - 160.0).max(100.0);

        let mut slider_frame = i64::from(session.current_frame());
        if ui
            .add(egui::Slider::new(&mut slider_frame, 0..=last).show_value(false))
            .changed()
        {
            action = TimelineAction::SetFrame(slider_frame);
        }

        // Typed values are clamped by the session
        let mut typed_frame = i64::from(session.current_frame());
        if ui.add(egui::DragValue::new(&mut typed_frame)).changed() {
            action = TimelineAction::SetFrame(typed_frame);
        }

        ui.label(format!("/ {}", last));
    });

    action
}
