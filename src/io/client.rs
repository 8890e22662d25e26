// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! HTTP client for the annotation server.
//!
//! The server keeps track of which video is loaded, so frame and
//! annotation calls are implicitly scoped to the last `load_video`.
//!
//! | Call                | Request                          | Response                        |
//! |---------------------|----------------------------------|---------------------------------|
//! | `load_video`        | `POST /load_video`               | `{ "total_frames"?: n }`        |
//! | `get_frame`         | `GET /get_frame?frame=n`         | encoded image                   |
//! | `get_annotations`   | `GET /get_annotations`           | `{ "<frame>": [[name, x, y]] }` |
//! | `save_annotation`   | `POST /save_annotation`          | --                              |
//! | `get_point_schema`  | `GET /get_skeleton_config`       | `{ "<key>": { "points": [...] } }` |
//!
//! Requests block; callers run them off the UI thread (see `io::worker`).

use crate::config::AnnotatorConfig;
use crate::error::ClientError;
use crate::models::annotation::FrameAnnotations;
use crate::models::schema::PointSchema;
use crate::models::session::{SaveRequest, VideoInfo};
use reqwest::blocking::{Client, Response};

#[derive(Debug, Clone)]
pub struct AnnotationClient {
    client: Client,
    base_url: String,
    schema_key: String,
}

impl AnnotationClient {
    pub fn new(config: &AnnotatorConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.server_url.clone(),
            schema_key: config.schema_key.clone(),
        })
    }

    /// Ask the server to open `path` and report its frame count.
    pub fn load_video(&self, path: &str) -> Result<VideoInfo, ClientError> {
        let body = serde_json::json!({ "video_path": path });
        let response = self.client.post(self.url("load_video")).json(&body).send()?;
        let text = Self::ensure_success(response)?.text()?;
        Ok(decode_video_info(&text)?)
    }

    /// Fetch the encoded image of `frame` of the loaded video.
    pub fn get_frame(&self, frame: u32) -> Result<Vec<u8>, ClientError> {
        let response = self
            .client
            .get(self.url("get_frame"))
            .query(&[("frame", frame)])
            .send()?;
        let bytes = Self::ensure_success(response)?.bytes()?;
        Ok(bytes.to_vec())
    }

    pub fn get_annotations(&self) -> Result<FrameAnnotations, ClientError> {
        let response = self.client.get(self.url("get_annotations")).send()?;
        let text = Self::ensure_success(response)?.text()?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Store the full point list of one frame, replacing what the server had.
    pub fn save_annotation(&self, request: &SaveRequest) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url("save_annotation"))
            .json(request)
            .send()?;
        Self::ensure_success(response)?;
        Ok(())
    }

    /// Fetch the point schema stored under the configured key.
    pub fn get_point_schema(&self) -> Result<PointSchema, ClientError> {
        let response = self.client.get(self.url("get_skeleton_config")).send()?;
        let text = Self::ensure_success(response)?.text()?;
        Ok(PointSchema::from_response(&text, &self.schema_key)?)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Turn a non-2xx response into [`ClientError::Status`] carrying the body.
    fn ensure_success(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Decode a load-video response body. `null` counts as an absent count.
pub fn decode_video_info(body: &str) -> Result<VideoInfo, serde_json::Error> {
    serde_json::from_str(body)
}
