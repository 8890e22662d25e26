// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Runtime configuration.
//!
//! Read from the process environment (after an optional `.env` file has
//! been loaded by `main`).
//!
//! | Variable                         | Default                 | Description                                  |
//! |----------------------------------|-------------------------|----------------------------------------------|
//! | `ANNOTATOR_SERVER_URL`           | `http://127.0.0.1:5000` | Base URL of the annotation server            |
//! | `ANNOTATOR_SCHEMA_KEY`           | `fly`                   | Entry of the schema response to annotate     |
//! | `ANNOTATOR_VIDEOS`               | --                      | Comma-separated video paths                  |
//! | `ANNOTATOR_VIDEO_LIST`           | --                      | File with one video path per line            |
//! | `ANNOTATOR_REQUEST_TIMEOUT_SECS` | `10`                    | Per-request HTTP timeout                     |

use crate::error::ConfigError;
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_SCHEMA_KEY: &str = "fly";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatorConfig {
    pub server_url: String,
    pub schema_key: String,
    pub videos: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            schema_key: DEFAULT_SCHEMA_KEY.to_string(),
            videos: Vec::new(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl AnnotatorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("ANNOTATOR_SERVER_URL") {
            config.server_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(key) = lookup("ANNOTATOR_SCHEMA_KEY") {
            config.schema_key = key.trim().to_string();
        }
        if let Some(value) = lookup("ANNOTATOR_REQUEST_TIMEOUT_SECS") {
            let secs = value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::InvalidNumber {
                    name: "ANNOTATOR_REQUEST_TIMEOUT_SECS",
                    value,
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(list) = lookup("ANNOTATOR_VIDEOS") {
            config.videos.extend(parse_video_lines(list.split(',')));
        }
        if let Some(path) = lookup("ANNOTATOR_VIDEO_LIST") {
            let contents = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::VideoList { path, source })?;
            config.videos.extend(parse_video_lines(contents.lines()));
        }

        Ok(config)
    }
}

fn parse_video_lines<'a>(entries: impl Iterator<Item = &'a str>) -> Vec<String> {
    entries
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
