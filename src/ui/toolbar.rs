// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with video selection and point placement controls.

use crate::models::session::SessionState;

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    SelectVideo(String),
    RemoveLastPoint,
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, videos: &[String], session: &SessionState) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Video:");
        let selected = session.video().unwrap_or("Select a video...");
        egui::ComboBox::from_id_source("video_select")
            .width(320.0)
            .selected_text(selected)
            .show_ui(ui, |ui| {
                for video in videos {
                    let is_current = session.video() == Some(video.as_str());
                    if ui.selectable_label(is_current, video.as_str()).clicked() && !is_current {
                        action = ToolbarAction::SelectVideo(video.clone());
                    }
                }
            });

        ui.separator();

        match session.current_point_name() {
            Some(name) => {
                ui.label(format!("Next point: {}", name));
            }
            None => {
                ui.spinner();
                ui.label(egui::RichText::new("Waiting for point schema").weak());
            }
        }

        let has_points = !session
            .annotations()
            .points(session.current_frame())
            .is_empty();
        if ui
            .add_enabled(has_points, egui::Button::new("Remove Point"))
            .clicked()
        {
            action = ToolbarAction::RemoveLastPoint;
        }

        ui.separator();

        ui.label(
            egui::RichText::new("Click the frame to place the next point, 1-9 picks a point")
                .italics()
                .weak(),
        );
    });

    action
}
