// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background request dispatch.
//!
//! Every request runs on its own thread and reports back over a channel the
//! UI drains once per frame. Responses carry the ticket of the request that
//! produced them; deciding whether they are still wanted is the session's
//! job. Saves are fire-and-forget: their outcome is reported for logging
//! only and never retried.

use super::client::AnnotationClient;
use super::media::{self, DecodedFrame};
use crate::error::ClientError;
use crate::models::annotation::FrameAnnotations;
use crate::models::schema::PointSchema;
use crate::models::session::{FrameTicket, Request, VideoInfo, VideoTicket};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Outcome of a background request.
#[derive(Debug)]
pub enum Response {
    Schema(Result<PointSchema, ClientError>),
    VideoInfo(VideoTicket, Result<VideoInfo, ClientError>),
    Frame(FrameTicket, Result<DecodedFrame, ClientError>),
    Annotations(VideoTicket, Result<FrameAnnotations, ClientError>),
    Saved { frame: u32, result: Result<(), ClientError> },
}

pub struct Worker {
    client: AnnotationClient,
    sender: Sender<Response>,
    receiver: Receiver<Response>,
    repaint: Option<egui::Context>,
}

impl Worker {
    /// Create a worker. When `repaint` is given, the UI is woken as soon as
    /// a response lands.
    pub fn new(client: AnnotationClient, repaint: Option<egui::Context>) -> Self {
        let (sender, receiver) = channel();
        Self {
            client,
            sender,
            receiver,
            repaint,
        }
    }

    pub fn fetch_schema(&self) {
        self.spawn(|client| Response::Schema(client.get_point_schema()));
    }

    pub fn dispatch(&self, request: Request) {
        match request {
            Request::LoadVideo { ticket, path } => {
                self.spawn(move |client| Response::VideoInfo(ticket, client.load_video(&path)));
            }
            Request::FetchFrame(ticket) => {
                self.spawn(move |client| {
                    let frame = client
                        .get_frame(ticket.frame)
                        .and_then(|bytes| media::decode_frame(&bytes).map_err(ClientError::from));
                    Response::Frame(ticket, frame)
                });
            }
            Request::FetchAnnotations(ticket) => {
                self.spawn(move |client| Response::Annotations(ticket, client.get_annotations()));
            }
            Request::SaveAnnotation(save) => {
                self.spawn(move |client| Response::Saved {
                    frame: save.frame,
                    result: client.save_annotation(&save),
                });
            }
        }
    }

    /// Next finished response, if any.
    pub fn try_recv(&self) -> Option<Response> {
        self.receiver.try_recv().ok()
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce(&AnnotationClient) -> Response + Send + 'static,
    {
        let client = self.client.clone();
        let sender = self.sender.clone();
        let repaint = self.repaint.clone();

        std::thread::spawn(move || {
            let response = job(&client);
            // The receiver only goes away when the app shuts down.
            let _ = sender.send(response);
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnnotatorConfig;
    use crate::models::session::{SaveRequest, SessionState};
    use std::time::{Duration, Instant};

    /// Points at a port nothing listens on so every request fails fast.
    fn unreachable_worker() -> Worker {
        let config = AnnotatorConfig {
            server_url: "http://127.0.0.1:9".into(),
            request_timeout: Duration::from_secs(2),
            ..AnnotatorConfig::default()
        };
        Worker::new(AnnotationClient::new(&config).unwrap(), None)
    }

    fn wait_for(worker: &Worker) -> Response {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(response) = worker.try_recv() {
                return response;
            }
            assert!(Instant::now() < deadline, "no response from worker");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_failed_save_is_reported_not_retried() {
        let worker = unreachable_worker();
        worker.dispatch(Request::SaveAnnotation(SaveRequest { frame: 3, points: Vec::new() }));

        match wait_for(&worker) {
            Response::Saved { frame, result } => {
                assert_eq!(frame, 3);
                assert!(result.is_err());
            }
            other => panic!("unexpected response {:?}", other),
        }
        std::thread::sleep(Duration::from_millis(50));
        assert!(worker.try_recv().is_none());
    }

    #[test]
    fn test_frame_response_keeps_its_ticket() {
        let worker = unreachable_worker();
        let mut session = SessionState::new();
        if let Request::LoadVideo { ticket, .. } = session.select_video("fly1.mp4") {
            session.apply_video_info(ticket, VideoInfo { total_frames: Some(100) });
        }
        let request = session.set_frame(42).expect("video is loaded");
        worker.dispatch(request);

        match wait_for(&worker) {
            Response::Frame(ticket, result) => {
                assert_eq!(ticket.frame, 42);
                assert!(session.is_current_frame(ticket));
                assert!(result.is_err());
            }
            other => panic!("unexpected response {:?}", other),
        }
    }
}
