// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation properties panel.
//!
//! Shows the point schema with the placement cursor, the points on the
//! current frame and a check of every annotated frame against the schema.

use crate::models::session::SessionState;
use crate::util::color;

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    SelectPoint(usize),
}

/// Display the properties panel.
pub fn show(ui: &mut egui::Ui, session: &SessionState) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Points");
    ui.separator();

    match session.schema() {
        Some(schema) => {
            for (idx, point) in schema.points().iter().enumerate() {
                ui.horizontal(|ui| {
                    let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                    ui.painter()
                        .circle_filled(rect.center(), 5.0, color::resolve_color(&point.color));

                    let label = format!("{}. {}", idx + 1, point.name);
                    if ui.selectable_label(idx == session.cursor(), label).clicked() {
                        action = PropertiesAction::SelectPoint(idx);
                    }
                });
            }
        }
        None => {
            ui.label(egui::RichText::new("Point schema not loaded").weak());
        }
    }

    ui.add_space(12.0);
    ui.heading(format!("Frame {}", session.current_frame()));
    ui.separator();

    let points = session.annotations().points(session.current_frame());
    if points.is_empty() {
        ui.label(egui::RichText::new("No points on this frame").weak());
    } else {
        egui::Grid::new("frame_points").striped(true).show(ui, |ui| {
            for point in points {
                ui.label(point.name.as_str());
                ui.label(format!("{:.0}", point.x));
                ui.label(format!("{:.0}", point.y));
                ui.end_row();
            }
        });
    }

    ui.add_space(12.0);
    ui.heading("Video");
    ui.separator();

    let summary = session.annotations().summary();
    ui.label(format!(
        "{} points on {} of {} frames",
        summary.total_points,
        summary.annotated_frames,
        session.total_frames()
    ));

    if let Some(schema) = session.schema() {
        let problems = session.annotations().validate(&schema.names());
        if problems.is_empty() {
            ui.label(egui::RichText::new("All annotated frames complete").weak());
        } else {
            egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                for problem in &problems {
                    ui.label(egui::RichText::new(problem).color(egui::Color32::from_rgb(230, 160, 60)));
                }
            });
        }
    }

    action
}
