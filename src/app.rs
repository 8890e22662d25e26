// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! The app is a thin adapter: it turns clicks, keys and finished server
//! requests into calls on [`SessionState`], and hands the requests those
//! calls return to the background [`Worker`]. All annotation logic lives in
//! the session.

use crate::error::{ClientError, SessionError};
use crate::io::media::DecodedFrame;
use crate::io::serialization::{self, ExportDocument};
use crate::io::worker::{Response, Worker};
use crate::models::session::{Request, SessionState};
use crate::ui::{canvas, properties, timeline, toolbar};
use crate::util::geometry::ViewTransform;

/// Message shown in the status bar.
struct Status {
    text: String,
    is_error: bool,
}

/// Decoded image of one frame, uploaded to the GPU.
struct ShownFrame {
    frame: u32,
    texture: egui::TextureHandle,
    size: (u32, u32),
}

/// Main application state.
pub struct AnnotatorApp {
    /// Annotation model for the selected video
    session: SessionState,

    /// Runs server requests off the UI thread
    worker: Worker,

    /// Videos offered in the selector
    videos: Vec<String>,

    /// Server the worker talks to, for the status bar
    server_url: String,

    /// Latest frame image received
    shown: Option<ShownFrame>,

    /// Canvas zoom and pan
    view: ViewTransform,

    /// Last notable event or failure
    status: Option<Status>,
}

impl AnnotatorApp {
    /// Create the app and start fetching the point schema.
    pub fn new(worker: Worker, videos: Vec<String>, server_url: String) -> Self {
        worker.fetch_schema();

        if videos.is_empty() {
            log::warn!("No videos configured, set ANNOTATOR_VIDEOS or ANNOTATOR_VIDEO_LIST");
        }

        Self {
            session: SessionState::new(),
            worker,
            videos,
            server_url,
            shown: None,
            view: ViewTransform::default(),
            status: None,
        }
    }

    fn send(&self, request: Request) {
        self.worker.dispatch(request);
    }

    /// Navigation yields no fetch until the server has the video loaded.
    fn send_frame(&self, request: Option<Request>) {
        if let Some(request) = request {
            self.send(request);
        }
    }

    fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: false,
        });
    }

    fn set_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::error!("{}", text);
        self.status = Some(Status {
            text,
            is_error: true,
        });
    }

    /// Surface a failed request, telling transient failures apart.
    fn report_failure(&mut self, what: &str, err: &ClientError) {
        if err.is_transient() {
            self.set_error(format!("{} failed (server unreachable or busy, try again): {}", what, err));
        } else {
            self.set_error(format!("{} failed: {}", what, err));
        }
    }

    fn select_video(&mut self, path: String) {
        self.shown = None;
        self.view = ViewTransform::default();
        let request = self.session.select_video(path);
        self.send(request);
    }

    fn place_point(&mut self, x: f64, y: f64) {
        match self.session.place_point(x, y) {
            Ok(save) => self.send(Request::SaveAnnotation(save)),
            // The canvas ignores clicks until the schema and video are in
            Err(e) => log::warn!("Click ignored: {}", e),
        }
    }

    fn remove_last_point(&mut self) {
        match self.session.remove_last_point() {
            Ok(save) => self.send(Request::SaveAnnotation(save)),
            Err(e) => log::info!("{}", e),
        }
    }

    /// Apply every response that finished since the last frame.
    fn drain_responses(&mut self, ctx: &egui::Context) {
        while let Some(response) = self.worker.try_recv() {
            match response {
                Response::Schema(Ok(schema)) => {
                    self.session.set_schema(schema);
                }
                Response::Schema(Err(e)) => self.report_failure("Loading point schema", &e),
                Response::VideoInfo(ticket, Ok(info)) => {
                    for request in self.session.apply_video_info(ticket, info) {
                        self.send(request);
                    }
                    if let Some(video) = self.session.video() {
                        let text = format!("Loaded {} ({} frames)", video, self.session.total_frames());
                        self.set_info(text);
                    }
                }
                Response::VideoInfo(ticket, Err(e)) => {
                    if self.session.abandon_video(ticket) {
                        self.report_failure("Loading video", &e);
                    }
                }
                Response::Frame(ticket, result) => {
                    if !self.session.is_current_frame(ticket) {
                        log::debug!("Discarding stale image for frame {}", ticket.frame);
                        continue;
                    }
                    match result {
                        Ok(frame) => self.show_frame(ctx, ticket.frame, frame),
                        Err(e) => self.report_failure(&format!("Loading frame {}", ticket.frame), &e),
                    }
                }
                Response::Annotations(ticket, Ok(annotations)) => {
                    self.session.apply_annotations(ticket, annotations);
                }
                Response::Annotations(_, Err(e)) => self.report_failure("Loading annotations", &e),
                Response::Saved { frame, result } => match result {
                    Ok(()) => log::debug!("Saved frame {}", frame),
                    Err(e) => log::warn!("Saving frame {} failed: {}", frame, e),
                },
            }
        }
    }

    fn show_frame(&mut self, ctx: &egui::Context, index: u32, frame: DecodedFrame) {
        let size = [frame.width as usize, frame.height as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &frame.pixels);
        let texture = ctx.load_texture("frame", color_image, egui::TextureOptions::LINEAR);

        self.shown = Some(ShownFrame {
            frame: index,
            texture,
            size: (frame.width, frame.height),
        });
    }

    fn export(&mut self, interpolate: bool, extension: &str) {
        let (filter, file_name) = match extension {
            "yaml" => ("YAML", "annotations.yaml"),
            "csv" => ("CSV", "annotations.csv"),
            _ => ("JSON", "annotations.json"),
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter(filter, &[extension])
            .set_file_name(file_name)
            .save_file()
        else {
            return;
        };

        let doc = ExportDocument::from_session(&self.session, interpolate);
        match serialization::export(&doc, &path) {
            Ok(()) => {
                log::info!("Exported annotations to {}", path.display());
                self.set_info(format!("Exported annotations to {}", path.display()));
            }
            Err(e) => self.set_error(format!("Failed to export annotations: {}", e)),
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        // Leave keys alone while the frame number field has focus
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
            let request = self.session.step_frame(-1);
            self.send_frame(request);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            let request = self.session.step_frame(1);
            self.send_frame(request);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            self.remove_last_point();
        }

        const POINT_KEYS: [egui::Key; 9] = [
            egui::Key::Num1,
            egui::Key::Num2,
            egui::Key::Num3,
            egui::Key::Num4,
            egui::Key::Num5,
            egui::Key::Num6,
            egui::Key::Num7,
            egui::Key::Num8,
            egui::Key::Num9,
        ];
        for (idx, key) in POINT_KEYS.iter().enumerate() {
            if ctx.input(|i| i.key_pressed(*key)) {
                self.session.select_point(idx);
            }
        }
    }
}

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_responses(ctx);

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    ui.menu_button("Export Annotations", |ui| {
                        if ui.button("Export as YAML...").clicked() {
                            self.export(false, "yaml");
                            ui.close_menu();
                        }
                        if ui.button("Export as JSON...").clicked() {
                            self.export(false, "json");
                            ui.close_menu();
                        }
                        if ui.button("Export as CSV...").clicked() {
                            self.export(false, "csv");
                            ui.close_menu();
                        }
                    });
                    ui.menu_button("Export Interpolated", |ui| {
                        if ui.button("Export as YAML...").clicked() {
                            self.export(true, "yaml");
                            ui.close_menu();
                        }
                        if ui.button("Export as JSON...").clicked() {
                            self.export(true, "json");
                            ui.close_menu();
                        }
                        if ui.button("Export as CSV...").clicked() {
                            self.export(true, "csv");
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("View", |ui| {
                    if ui.button("Reset Zoom").clicked() {
                        self.view = ViewTransform::default();
                        ui.close_menu();
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &self.videos, &self.session))
            .inner;

        match toolbar_action {
            toolbar::ToolbarAction::SelectVideo(path) => self.select_video(path),
            toolbar::ToolbarAction::RemoveLastPoint => self.remove_last_point(),
            toolbar::ToolbarAction::None => {}
        }

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("Server: {}", self.server_url));
                ui.separator();
                match &self.status {
                    Some(status) if status.is_error => {
                        ui.label(egui::RichText::new(&status.text).color(egui::Color32::from_rgb(230, 80, 80)));
                    }
                    Some(status) => {
                        ui.label(status.text.as_str());
                    }
                    None => {
                        ui.label("Ready");
                    }
                }
            });
        });

        // Timeline
        let timeline_action = egui::TopBottomPanel::bottom("timeline")
            .show(ctx, |ui| timeline::show(ui, &self.session))
            .inner;

        match timeline_action {
            timeline::TimelineAction::SetFrame(index) => {
                let request = self.session.set_frame(index);
                self.send_frame(request);
            }
            timeline::TimelineAction::Step(delta) => {
                let request = self.session.step_frame(delta);
                self.send_frame(request);
            }
            timeline::TimelineAction::None => {}
        }

        // Properties panel (right side)
        let properties_action = egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| properties::show(ui, &self.session))
            .inner;

        if let properties::PropertiesAction::SelectPoint(idx) = properties_action {
            self.session.select_point(idx);
        }

        self.handle_keys(ctx);

        // Markers wait for the image of the current frame
        let image_ready = self.session.is_image_ready(self.shown.as_ref().map(|shown| shown.frame));

        let rendered = if image_ready {
            self.session.render(self.session.current_frame())
        } else {
            Ok(Vec::new())
        };
        let markers = match rendered {
            Ok(markers) => markers,
            Err(e @ SessionError::UnknownPointName { .. }) => {
                let text = format!("Cannot draw frame: {}", e);
                if self.status.as_ref().map(|s| s.text.as_str()) != Some(text.as_str()) {
                    self.set_error(text);
                }
                Vec::new()
            }
            Err(_) => Vec::new(),
        };

        // Main canvas (center)
        let frame = self
            .shown
            .as_ref()
            .filter(|_| image_ready)
            .map(|shown| (&shown.texture, shown.size));
        let can_place = frame.is_some() && self.session.schema().is_some();
        let has_video = self.session.video().is_some();
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| canvas::show(ui, frame, &mut self.view, &markers, can_place, has_video))
            .inner;

        if let canvas::CanvasAction::PlacePoint { x, y } = canvas_action {
            self.place_point(x, y);
        }
    }
}
