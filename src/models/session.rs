// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation session state.
//!
//! Holds the frame cursor, the point schema, the per-frame annotations and
//! the index of the next point to place. Operations never perform I/O:
//! they mutate the state and hand back the [`Request`] the caller should
//! send to the server. Responses are applied through the `apply_*` methods,
//! which check the request's ticket so an answer that arrives after the
//! user moved on is dropped instead of overwriting newer state.
//!
//! Between `select_video` and its load-video response the server still
//! serves the previous video. During that window the session issues no
//! frame fetches and accepts no points.

use super::annotation::{AnnotatedPoint, FrameAnnotations};
use super::schema::PointSchema;
use crate::error::SessionError;
use serde::{Deserialize, Serialize};

/// Frame count used when the server does not report one.
///
/// The server omits `total_frames` (or reports 0) when it runs without a
/// real video backend; the annotator still needs a navigable range then.
pub const FALLBACK_TOTAL_FRAMES: u32 = 100;

/// Identifies the video selection a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoTicket {
    generation: u64,
}

/// Identifies the frame image request a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
    pub frame: u32,
}

/// Body of the load-video response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub total_frames: Option<u32>,
}

/// Body of a save-annotation request: the full point list of one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveRequest {
    pub frame: u32,
    pub points: Vec<AnnotatedPoint>,
}

/// Work the caller must hand to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    LoadVideo { ticket: VideoTicket, path: String },
    FetchFrame(FrameTicket),
    FetchAnnotations(VideoTicket),
    SaveAnnotation(SaveRequest),
}

/// One marker to paint over the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub x: f64,
    pub y: f64,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    video: Option<String>,
    /// Waiting for the load-video response of `video`
    loading: bool,
    generation: u64,
    current_frame: u32,
    total_frames: u32,
    schema: Option<PointSchema>,
    cursor: usize,
    annotations: FrameAnnotations,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            video: None,
            loading: false,
            generation: 0,
            current_frame: 0,
            total_frames: FALLBACK_TOTAL_FRAMES,
            schema: None,
            cursor: 0,
            annotations: FrameAnnotations::new(),
        }
    }

    pub fn video(&self) -> Option<&str> {
        self.video.as_deref()
    }

    /// Whether the server has the selected video loaded.
    pub fn is_ready(&self) -> bool {
        self.video.is_some() && !self.loading
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    pub fn schema(&self) -> Option<&PointSchema> {
        self.schema.as_ref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn annotations(&self) -> &FrameAnnotations {
        &self.annotations
    }

    /// Name of the point the next click will place.
    pub fn current_point_name(&self) -> Option<&str> {
        self.schema
            .as_ref()
            .map(|s| s.points()[self.cursor].name.as_str())
    }

    /// Install the point schema. Only the first schema is accepted.
    pub fn set_schema(&mut self, schema: PointSchema) -> bool {
        if self.schema.is_some() {
            log::warn!("Ignoring second point schema, the first one stays for the session");
            return false;
        }
        log::info!("Point schema loaded: {}", schema.names().join(", "));
        self.schema = Some(schema);
        self.cursor = 0;
        true
    }

    /// Start a fresh session for `path`.
    ///
    /// Frame, cursor and annotations reset right away; anything in flight
    /// for the previous video becomes stale. Navigation and placement stay
    /// off until [`apply_video_info`](Self::apply_video_info).
    pub fn select_video(&mut self, path: impl Into<String>) -> Request {
        let path = path.into();
        self.generation += 1;
        self.video = Some(path.clone());
        self.loading = true;
        self.total_frames = FALLBACK_TOTAL_FRAMES;
        self.current_frame = 0;
        self.cursor = 0;
        self.annotations = FrameAnnotations::new();
        log::info!("Selected video {}", path);

        Request::LoadVideo {
            ticket: self.video_ticket(),
            path,
        }
    }

    /// Apply the load-video response and return the follow-up fetches.
    pub fn apply_video_info(&mut self, ticket: VideoTicket, info: VideoInfo) -> Vec<Request> {
        if !self.is_current_video(ticket) {
            log::debug!("Discarding stale video info");
            return Vec::new();
        }

        self.total_frames = match info.total_frames {
            Some(n) if n > 0 => n,
            _ => {
                log::info!(
                    "Server reported no frame count, falling back to {}",
                    FALLBACK_TOTAL_FRAMES
                );
                FALLBACK_TOTAL_FRAMES
            }
        };
        self.loading = false;
        self.current_frame = 0;

        vec![self.frame_request(), self.refresh_annotations()]
    }

    /// Give up on a video whose load-video request failed.
    ///
    /// The selection is cleared so the same video can be picked again.
    pub fn abandon_video(&mut self, ticket: VideoTicket) -> bool {
        if !self.is_current_video(ticket) {
            return false;
        }
        self.video = None;
        self.loading = false;
        true
    }

    /// Move to `index`, clamped into the valid frame range.
    ///
    /// Returns the image fetch for the new frame, or `None` when there is
    /// no loaded video to fetch from. While a video is loading the frame
    /// does not move.
    pub fn set_frame(&mut self, index: i64) -> Option<Request> {
        if self.loading {
            log::debug!("Ignoring frame change while the video loads");
            return None;
        }
        let last = i64::from(self.total_frames - 1);
        self.current_frame = index.clamp(0, last) as u32;
        self.is_ready().then(|| self.frame_request())
    }

    pub fn step_frame(&mut self, delta: i64) -> Option<Request> {
        self.set_frame(i64::from(self.current_frame) + delta)
    }

    /// Whether a frame image response should still be shown.
    pub fn is_current_frame(&self, ticket: FrameTicket) -> bool {
        ticket.generation == self.generation && ticket.frame == self.current_frame
    }

    /// Whether the image on screen, showing `shown_frame`, is the current
    /// frame. Markers and clicks only apply once it is.
    pub fn is_image_ready(&self, shown_frame: Option<u32>) -> bool {
        self.is_ready() && shown_frame == Some(self.current_frame)
    }

    /// Place the next schema point at `(x, y)` on the current frame.
    ///
    /// Points cycle strictly by position; a name already present on this
    /// frame is placed again when the cursor comes back to it.
    pub fn place_point(&mut self, x: f64, y: f64) -> Result<SaveRequest, SessionError> {
        let schema = self.schema.as_ref().ok_or(SessionError::SchemaNotLoaded)?;
        if !self.is_ready() {
            return Err(SessionError::VideoNotLoaded);
        }
        let name = schema.points()[self.cursor].name.clone();
        self.cursor = (self.cursor + 1) % schema.len();

        log::info!(
            "Placed {} at ({:.1}, {:.1}) on frame {}",
            name,
            x,
            y,
            self.current_frame
        );
        self.annotations
            .push(self.current_frame, AnnotatedPoint::new(name, x, y));

        Ok(self.save_request())
    }

    /// Remove the most recently placed point on the current frame.
    ///
    /// The cursor stays where it is.
    pub fn remove_last_point(&mut self) -> Result<SaveRequest, SessionError> {
        let removed = self
            .annotations
            .pop(self.current_frame)
            .ok_or(SessionError::NoPointsOnFrame(self.current_frame))?;
        log::info!("Removed {} from frame {}", removed.name, self.current_frame);
        Ok(self.save_request())
    }

    /// Point the cursor at schema entry `index`.
    pub fn select_point(&mut self, index: usize) -> bool {
        match &self.schema {
            Some(schema) if index < schema.len() => {
                self.cursor = index;
                true
            }
            _ => false,
        }
    }

    /// Ask the server for the stored annotations of the current video.
    pub fn refresh_annotations(&self) -> Request {
        Request::FetchAnnotations(self.video_ticket())
    }

    /// Replace the whole mapping with the server's copy.
    pub fn apply_annotations(&mut self, ticket: VideoTicket, annotations: FrameAnnotations) -> bool {
        if !self.is_current_video(ticket) {
            log::debug!("Discarding stale annotations");
            return false;
        }
        let summary = annotations.summary();
        log::info!(
            "Loaded {} points on {} frames",
            summary.total_points,
            summary.annotated_frames
        );
        self.annotations = annotations;
        true
    }

    /// Resolve the markers for `frame`.
    pub fn render(&self, frame: u32) -> Result<Vec<DrawCommand>, SessionError> {
        let points = self.annotations.points(frame);
        if points.is_empty() {
            return Ok(Vec::new());
        }
        let schema = self.schema.as_ref().ok_or(SessionError::SchemaNotLoaded)?;

        points
            .iter()
            .map(|point| -> Result<DrawCommand, SessionError> {
                let point_spec = schema
                    .find(&point.name)
                    .ok_or_else(|| SessionError::UnknownPointName {
                        frame,
                        name: point.name.clone(),
                    })?;
                Ok(DrawCommand {
                    x: point.x,
                    y: point.y,
                    color: point_spec.color.clone(),
                })
            })
            .collect()
    }

    fn video_ticket(&self) -> VideoTicket {
        VideoTicket {
            generation: self.generation,
        }
    }

    fn is_current_video(&self, ticket: VideoTicket) -> bool {
        ticket.generation == self.generation
    }

    fn frame_request(&self) -> Request {
        Request::FetchFrame(FrameTicket {
            generation: self.generation,
            frame: self.current_frame,
        })
    }

    fn save_request(&self) -> SaveRequest {
        SaveRequest {
            frame: self.current_frame,
            points: self.annotations.points(self.current_frame).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schema::PointSpec;
    use assert_matches::assert_matches;

    fn head_tail() -> PointSchema {
        PointSchema::new(vec![PointSpec::new("head", "red"), PointSpec::new("tail", "blue")]).unwrap()
    }

    fn schema_of(n: usize) -> PointSchema {
        PointSchema::new(
            (0..n)
                .map(|i| PointSpec::new(format!("p{}", i), "white"))
                .collect(),
        )
        .unwrap()
    }

    /// Session on a loaded video with `total` frames and the given schema.
    fn loaded(total: u32, schema: PointSchema) -> SessionState {
        let mut session = SessionState::new();
        session.set_schema(schema);
        let ticket = match session.select_video("x.mp4") {
            Request::LoadVideo { ticket, .. } => ticket,
            other => panic!("unexpected request {:?}", other),
        };
        session.apply_video_info(ticket, VideoInfo { total_frames: Some(total) });
        session
    }

    fn video_ticket(request: &Request) -> VideoTicket {
        match request {
            Request::LoadVideo { ticket, .. } | Request::FetchAnnotations(ticket) => *ticket,
            other => panic!("no video ticket in {:?}", other),
        }
    }

    fn frame_ticket(request: Option<&Request>) -> FrameTicket {
        match request {
            Some(Request::FetchFrame(ticket)) => *ticket,
            other => panic!("no frame ticket in {:?}", other),
        }
    }

    #[test]
    fn test_head_tail_scenario() {
        let mut session = loaded(10, head_tail());

        let save = session.place_point(5.0, 5.0).unwrap();
        assert_eq!(save.frame, 0);
        assert_eq!(session.annotations().points(0), &[AnnotatedPoint::new("head", 5.0, 5.0)]);
        assert_eq!(session.cursor(), 1);

        let save = session.place_point(6.0, 6.0).unwrap();
        assert_eq!(
            save.points,
            vec![AnnotatedPoint::new("head", 5.0, 5.0), AnnotatedPoint::new("tail", 6.0, 6.0)]
        );
        assert_eq!(session.cursor(), 0);

        session.set_frame(3);
        session.place_point(1.0, 1.0).unwrap();
        assert_eq!(session.annotations().points(3), &[AnnotatedPoint::new("head", 1.0, 1.0)]);
        assert_eq!(session.annotations().points(0).len(), 2);
    }

    #[test]
    fn test_cursor_cycles_mod_schema_length() {
        for n in 1..=5 {
            let mut session = loaded(10, schema_of(n));
            for k in 1..=12 {
                let save = session.place_point(k as f64, 0.0).unwrap();
                assert_eq!(session.cursor(), k % n);
                assert_eq!(save.points.last().unwrap().name, format!("p{}", (k - 1) % n));
            }
        }
    }

    #[test]
    fn test_same_name_placed_again_on_one_frame() {
        let mut session = loaded(10, schema_of(2));
        for _ in 0..3 {
            session.place_point(0.0, 0.0).unwrap();
        }
        let names: Vec<&str> = session.annotations().points(0).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["p0", "p1", "p0"]);
    }

    #[test]
    fn test_set_frame_clamps() {
        let mut session = loaded(10, head_tail());
        for (index, expected) in [(999, 9), (-5, 0), (4, 4), (9, 9), (10, 9), (i64::MIN, 0), (i64::MAX, 9)] {
            let request = session.set_frame(index);
            assert_eq!(session.current_frame(), expected);
            assert_eq!(frame_ticket(request.as_ref()).frame, expected);
        }
    }

    #[test]
    fn test_step_frame_matches_set_frame() {
        for delta in [-20, -1, 0, 1, 3, 20] {
            let mut stepped = loaded(10, head_tail());
            let mut direct = loaded(10, head_tail());
            stepped.set_frame(5);
            direct.set_frame(5);

            stepped.step_frame(delta);
            direct.set_frame(5 + delta);
            assert_eq!(stepped.current_frame(), direct.current_frame());
        }
    }

    #[test]
    fn test_cursor_survives_navigation() {
        let mut session = loaded(20, schema_of(5));
        session.set_frame(10);
        for _ in 0..3 {
            session.place_point(0.0, 0.0).unwrap();
        }
        session.step_frame(1);
        session.place_point(1.0, 1.0).unwrap();
        assert_eq!(session.annotations().points(11)[0].name, "p3");
    }

    #[test]
    fn test_placing_only_touches_current_frame() {
        let mut session = loaded(10, head_tail());
        session.place_point(1.0, 1.0).unwrap();
        let before = session.annotations().points(0).to_vec();

        session.set_frame(7);
        session.place_point(2.0, 2.0).unwrap();
        session.place_point(3.0, 3.0).unwrap();

        assert_eq!(session.annotations().points(0), before.as_slice());
        assert!(session.annotations().points(6).is_empty());
        assert_eq!(session.annotations().summary().annotated_frames, 2);
    }

    #[test]
    fn test_place_without_schema() {
        let mut session = SessionState::new();
        session.select_video("x.mp4");
        assert_matches!(session.place_point(1.0, 1.0), Err(SessionError::SchemaNotLoaded));
        assert!(session.annotations().is_empty());
    }

    #[test]
    fn test_schema_is_set_once() {
        let mut session = SessionState::new();
        assert!(session.set_schema(head_tail()));
        assert!(!session.set_schema(schema_of(3)));
        assert_eq!(session.schema().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_frame_count_falls_back() {
        let mut session = SessionState::new();
        let request = session.select_video("x.mp4");
        let info: VideoInfo = serde_json::from_str("{}").unwrap();
        let follow_up = session.apply_video_info(video_ticket(&request), info);

        assert_eq!(session.total_frames(), FALLBACK_TOTAL_FRAMES);
        assert_eq!(session.current_frame(), 0);
        assert_eq!(follow_up.len(), 2);
        assert_eq!(frame_ticket(follow_up.first()).frame, 0);
        assert_matches!(follow_up[1], Request::FetchAnnotations(_));
    }

    #[test]
    fn test_zero_frame_count_falls_back() {
        let mut session = SessionState::new();
        let request = session.select_video("x.mp4");
        session.apply_video_info(video_ticket(&request), VideoInfo { total_frames: Some(0) });
        assert_eq!(session.total_frames(), FALLBACK_TOTAL_FRAMES);
    }

    #[test]
    fn test_select_video_resets_session() {
        let mut session = loaded(50, schema_of(3));
        session.set_frame(20);
        session.place_point(1.0, 1.0).unwrap();

        session.select_video("y.mp4");
        assert_eq!(session.video(), Some("y.mp4"));
        assert_eq!(session.current_frame(), 0);
        assert_eq!(session.cursor(), 0);
        assert!(session.annotations().is_empty());
        assert!(session.schema().is_some());
    }

    #[test]
    fn test_refresh_replaces_instead_of_merging() {
        let mut session = loaded(10, head_tail());
        session.place_point(1.0, 1.0).unwrap();
        session.set_frame(2);
        session.place_point(2.0, 2.0).unwrap();

        let mut stored = FrameAnnotations::new();
        stored.push(5, AnnotatedPoint::new("tail", 9.0, 9.0));
        let ticket = video_ticket(&session.refresh_annotations());
        assert!(session.apply_annotations(ticket, stored.clone()));

        assert_eq!(session.annotations(), &stored);
        assert!(session.annotations().points(0).is_empty());
    }

    #[test]
    fn test_stale_responses_are_discarded() {
        let mut session = SessionState::new();
        let old = video_ticket(&session.select_video("a.mp4"));
        let new = video_ticket(&session.select_video("b.mp4"));

        assert!(session.apply_video_info(old, VideoInfo { total_frames: Some(7) }).is_empty());
        assert_eq!(session.total_frames(), FALLBACK_TOTAL_FRAMES);

        let mut stored = FrameAnnotations::new();
        stored.push(0, AnnotatedPoint::new("head", 1.0, 1.0));
        assert!(!session.apply_annotations(old, stored));
        assert!(session.annotations().is_empty());

        let follow_up = session.apply_video_info(new, VideoInfo { total_frames: Some(7) });
        assert_eq!(session.total_frames(), 7);
        let first_frame = frame_ticket(follow_up.first());
        assert!(session.is_current_frame(first_frame));

        session.select_video("c.mp4");
        assert!(!session.is_current_frame(first_frame));
    }

    #[test]
    fn test_out_of_order_frame_response() {
        let mut session = loaded(10, head_tail());
        let slow = frame_ticket(session.set_frame(3).as_ref());
        let fast = frame_ticket(session.set_frame(4).as_ref());

        assert!(session.is_current_frame(fast));
        assert!(!session.is_current_frame(slow));
    }

    #[test]
    fn test_video_switch_waits_for_load() {
        let mut session = loaded(500, head_tail());
        session.set_frame(250);
        let load = session.select_video("b.mp4");
        assert!(!session.is_ready());
        assert_eq!(session.total_frames(), FALLBACK_TOTAL_FRAMES);

        // The server still has the previous video open
        assert_eq!(session.set_frame(300), None);
        assert_eq!(session.step_frame(1), None);
        assert_eq!(session.current_frame(), 0);
        assert_matches!(session.place_point(1.0, 1.0), Err(SessionError::VideoNotLoaded));
        assert!(session.annotations().is_empty());
        assert_eq!(session.cursor(), 0);

        let follow_up = session.apply_video_info(video_ticket(&load), VideoInfo { total_frames: Some(10) });
        assert!(session.is_ready());
        assert!(session.is_current_frame(frame_ticket(follow_up.first())));
        assert_eq!(frame_ticket(session.set_frame(300).as_ref()).frame, 9);
        assert!(session.place_point(1.0, 1.0).is_ok());
    }

    #[test]
    fn test_frame_requests_need_a_video() {
        let mut session = SessionState::new();
        assert_eq!(session.set_frame(5), None);
        assert_eq!(session.current_frame(), 5);

        session.set_schema(head_tail());
        assert_matches!(session.place_point(1.0, 1.0), Err(SessionError::VideoNotLoaded));
    }

    #[test]
    fn test_failed_load_clears_selection() {
        let mut session = SessionState::new();
        let stale = video_ticket(&session.select_video("a.mp4"));
        let current = video_ticket(&session.select_video("b.mp4"));

        assert!(!session.abandon_video(stale));
        assert_eq!(session.video(), Some("b.mp4"));

        assert!(session.abandon_video(current));
        assert_eq!(session.video(), None);
        assert!(!session.is_ready());
        assert_matches!(session.select_video("b.mp4"), Request::LoadVideo { .. });
    }

    #[test]
    fn test_overlay_waits_for_current_image() {
        let mut session = loaded(10, head_tail());
        assert!(session.is_image_ready(Some(0)));

        session.set_frame(4);
        assert!(!session.is_image_ready(Some(0)));
        assert!(!session.is_image_ready(None));
        assert!(session.is_image_ready(Some(4)));

        session.select_video("y.mp4");
        assert!(!session.is_image_ready(Some(0)));
    }

    #[test]
    fn test_render_resolves_colors() {
        let mut session = loaded(10, head_tail());
        session.place_point(5.0, 6.0).unwrap();
        session.place_point(7.0, 8.0).unwrap();

        let commands = session.render(0).unwrap();
        assert_eq!(
            commands,
            vec![
                DrawCommand { x: 5.0, y: 6.0, color: "red".into() },
                DrawCommand { x: 7.0, y: 8.0, color: "blue".into() },
            ]
        );
        assert!(session.render(1).unwrap().is_empty());
    }

    #[test]
    fn test_render_unknown_point_name() {
        let mut session = loaded(10, head_tail());
        let mut stored = FrameAnnotations::new();
        stored.push(2, AnnotatedPoint::new("wing", 1.0, 1.0));
        let ticket = video_ticket(&session.refresh_annotations());
        session.apply_annotations(ticket, stored);

        assert_matches!(
            session.render(2),
            Err(SessionError::UnknownPointName { frame: 2, name }) if name == "wing"
        );
    }

    #[test]
    fn test_remove_last_point_keeps_cursor() {
        let mut session = loaded(10, schema_of(3));
        session.place_point(1.0, 1.0).unwrap();
        session.place_point(2.0, 2.0).unwrap();

        let save = session.remove_last_point().unwrap();
        assert_eq!(save.points, vec![AnnotatedPoint::new("p0", 1.0, 1.0)]);
        assert_eq!(session.cursor(), 2);

        session.remove_last_point().unwrap();
        assert_matches!(session.remove_last_point(), Err(SessionError::NoPointsOnFrame(0)));
    }

    #[test]
    fn test_select_point() {
        let mut session = SessionState::new();
        assert!(!session.select_point(0));

        session.set_schema(schema_of(3));
        assert!(session.select_point(2));
        assert_eq!(session.current_point_name(), Some("p2"));
        assert!(!session.select_point(3));
        assert_eq!(session.cursor(), 2);
    }

    #[test]
    fn test_save_request_wire_format() {
        let mut session = loaded(10, head_tail());
        session.set_frame(4);
        let save = session.place_point(3.0, 4.5).unwrap();
        assert_eq!(
            serde_json::to_value(&save).unwrap(),
            serde_json::json!({"frame": 4, "points": [["head", 3.0, 4.5]]})
        );
    }
}
